// Failure taxonomy for source ingestion
//
// Reference-level failures never leave the fetcher as errors: they are
// rendered with `embedded()` and written into the artifact instead.

use thiserror::Error;

/// Prefix every embedded failure carries so the downstream reader can spot it.
pub const ERROR_MARKER: &str = "[ERROR]";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Document parsing failed for {path}: {reason}")]
    DocumentParse { path: String, reason: String },

    #[error("Document converter '{command}' is not available. Install it with: pip install docling")]
    ConverterUnavailable { command: String },
}

impl FetchError {
    /// Text written into the artifact in place of the source content
    pub fn embedded(&self) -> String {
        format!("{} {}", ERROR_MARKER, self)
    }
}
