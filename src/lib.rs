// grace-ctx - context bundler for staged LLM workflows
// Library exports

pub mod assemble;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod index;
pub mod normalize;

pub use assemble::{AssemblyRequest, ContextAssembler, Mode};
pub use config::Config;
pub use errors::FetchError;
pub use fetch::{FetchResult, SourceFetcher, SourceKind};
pub use index::{DirectoryEntry, DirectoryIndexer, EntryKind};
