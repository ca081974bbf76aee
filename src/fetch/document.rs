// Binary document conversion (PDF, DOCX, PPTX -> Markdown)
//
// The converter is an injected capability: `detect_converter` probes for the
// external tool once at startup and the fetcher is built with the result.
// A fetcher without a converter reports every document as unavailable.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::FetchError;

/// Turns a document on disk into Markdown text.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Command or backend name, used in advisory messages
    fn name(&self) -> &str;

    async fn convert(&self, path: &Path) -> Result<String, FetchError>;
}

/// Converter backed by the `docling` command line tool.
///
/// Runs with table structure recognition (accurate mode) and formula
/// enrichment on, OCR off.
pub struct DoclingConverter {
    command: String,
}

impl DoclingConverter {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Return a converter if `command --version` runs successfully.
    pub async fn detect(command: &str) -> Option<Self> {
        let status = Command::new(command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(s) if s.success() => {
                info!("Document converter available: {}", command);
                Some(Self::new(command))
            }
            Ok(s) => {
                debug!("{} --version exited with {}", command, s);
                None
            }
            Err(e) => {
                debug!("Document converter {} not found: {}", command, e);
                None
            }
        }
    }

    fn parse_error(&self, path: &Path, reason: impl Into<String>) -> FetchError {
        FetchError::DocumentParse {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl DocumentConverter for DoclingConverter {
    fn name(&self) -> &str {
        &self.command
    }

    async fn convert(&self, path: &Path) -> Result<String, FetchError> {
        let out_dir = tempfile::TempDir::new().map_err(|e| FetchError::Io {
            path: std::env::temp_dir().display().to_string(),
            source: e,
        })?;

        let output = Command::new(&self.command)
            .arg(path)
            .args([
                "--to",
                "md",
                "--no-ocr",
                "--table-mode",
                "accurate",
                "--enrich-formula",
                "--output",
            ])
            .arg(out_dir.path())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.parse_error(path, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr.lines().last().unwrap_or("").trim().to_string();
            return Err(self.parse_error(
                path,
                format!("{} exited with {}: {}", self.command, output.status, last_line),
            ));
        }

        let markdown_path = find_markdown_output(out_dir.path(), path)
            .ok_or_else(|| self.parse_error(path, "converter produced no Markdown output"))?;

        std::fs::read_to_string(&markdown_path).map_err(|e| FetchError::Io {
            path: markdown_path.display().to_string(),
            source: e,
        })
    }
}

/// `<stem>.md` in the output directory, or the first `.md` file found there.
fn find_markdown_output(out_dir: &Path, input: &Path) -> Option<PathBuf> {
    if let Some(stem) = input.file_stem() {
        let expected = out_dir.join(stem).with_extension("md");
        if expected.exists() {
            return Some(expected);
        }
    }

    std::fs::read_dir(out_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|p| p.extension().map(|ext| ext == "md").unwrap_or(false))
}

/// Probe once for the configured converter.
pub async fn detect_converter(command: &str) -> Option<Arc<dyn DocumentConverter>> {
    DoclingConverter::detect(command)
        .await
        .map(|c| Arc::new(c) as Arc<dyn DocumentConverter>)
}
