// Directory indexer - tree rendering and file collection over source roots
//
// Roots are walked in the order given; inside a root entries are visited
// depth-first in file-name order so output is reproducible. Excluded
// directory names are pruned at every depth (never descended into).

pub mod skeleton;

pub use skeleton::extract_skeleton;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::Config;

/// Indentation unit used by the rendered tree.
const TREE_INDENT: &str = "    ";

/// How a file's content is represented in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Full,
    Skeleton,
}

/// One file produced by the indexer.
///
/// `path` is the root joined with the relative path, so it is relative or
/// absolute exactly as the root was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    pub content: String,
    pub kind: EntryKind,
}

pub struct DirectoryIndexer {
    exclude_dirs: HashSet<String>,
    skip_extensions: HashSet<String>,
}

impl DirectoryIndexer {
    pub fn new<E, S>(exclude_dirs: E, skip_extensions: S) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            exclude_dirs: exclude_dirs.into_iter().map(Into::<String>::into).collect(),
            skip_extensions: skip_extensions
                .into_iter()
                .map(|ext| Into::<String>::into(ext).to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.exclude_dirs.iter().cloned(),
            config.skip_extensions.iter().cloned(),
        )
    }

    /// Render a combined tree for all roots.
    ///
    /// A missing root becomes a `[MISSING DIRECTORY: ...]` line and the
    /// remaining roots are still rendered.
    pub fn render_tree(&self, roots: &[PathBuf]) -> String {
        let mut tree = String::new();

        for root in roots {
            if !root.exists() {
                tree.push_str(&format!("[MISSING DIRECTORY: {}]\n", root.display()));
                continue;
            }

            tree.push_str(&format!("ROOT: {}/\n", root.display()));
            for entry in self.walk(root) {
                let indent = TREE_INDENT.repeat(entry.depth() + 1);
                let name = entry.file_name().to_string_lossy();
                if entry.file_type().is_dir() {
                    tree.push_str(&format!("{}|-- {}/\n", indent, name));
                } else {
                    tree.push_str(&format!("{}|-- {}\n", indent, name));
                }
            }
            tree.push('\n');
        }

        tree
    }

    /// Collect every embeddable file under the roots.
    ///
    /// Asset files (by extension) and files that are not valid UTF-8 are
    /// left out; they still show up in `render_tree`.
    pub fn collect_entries(&self, roots: &[PathBuf], kind: EntryKind) -> Vec<DirectoryEntry> {
        let mut entries = Vec::new();

        for root in roots {
            if !root.exists() {
                debug!("Skipping missing source root {}", root.display());
                continue;
            }

            for entry in self.walk(root) {
                if !entry.file_type().is_file() || self.is_asset(entry.path()) {
                    continue;
                }

                let content = match fs::read_to_string(entry.path()) {
                    Ok(c) => c,
                    Err(e) => {
                        debug!("Skipping unreadable file {}: {}", entry.path().display(), e);
                        continue;
                    }
                };

                let content = match kind {
                    EntryKind::Full => content,
                    EntryKind::Skeleton => extract_skeleton(&content),
                };

                entries.push(DirectoryEntry {
                    path: entry.into_path(),
                    content,
                    kind,
                });
            }
        }

        entries
    }

    fn walk<'a>(&'a self, root: &Path) -> impl Iterator<Item = DirEntry> + 'a {
        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !self.is_excluded(entry))
            .filter_map(|result| match result {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    None
                }
            })
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self
                .exclude_dirs
                .contains(entry.file_name().to_string_lossy().as_ref())
    }

    fn is_asset(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| {
                self.skip_extensions
                    .contains(&ext.to_string_lossy().to_ascii_lowercase())
            })
            .unwrap_or(false)
    }
}
