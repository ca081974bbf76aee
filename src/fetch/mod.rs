// Source fetcher - resolves a source reference into embeddable text
//
// Local paths and http(s) URLs are both accepted; binary documents go through
// the injected DocumentConverter, markup goes through the normalizer. Every
// failure is turned into an `[ERROR] ...` string at this boundary, so the
// caller always gets exactly one FetchResult per reference.

pub mod document;

pub use document::{detect_converter, DoclingConverter, DocumentConverter};

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::FetchSettings;
use crate::errors::FetchError;
use crate::normalize::{html_to_markdown, looks_like_html};

/// Document extensions handled by the converter instead of read as text.
const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".pptx"];

/// Content types (as reported by a HEAD probe) that mark a document.
const DOCUMENT_CONTENT_TYPES: &[(&str, &str)] = &[
    ("application/pdf", ".pdf"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".docx",
    ),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ".pptx",
    ),
];

/// Where a reference lives and how its bytes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    LocalText,
    LocalDocument,
    RemoteText,
    RemoteDocument,
}

/// Outcome of fetching one reference. `text` is always embeddable; on
/// failure it holds the `[ERROR] ...` message and `error` keeps the cause.
#[derive(Debug)]
pub struct FetchResult {
    pub source: String,
    pub kind: SourceKind,
    pub text: String,
    pub error: Option<FetchError>,
}

impl FetchResult {
    fn from_outcome(source: &str, kind: SourceKind, outcome: Result<String, FetchError>) -> Self {
        match outcome {
            Ok(text) => Self {
                source: source.to_string(),
                kind,
                text,
                error: None,
            },
            Err(err) => Self {
                source: source.to_string(),
                kind,
                text: err.embedded(),
                error: Some(err),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

pub fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Document extension of the reference, ignoring any URL query or fragment.
pub fn document_extension(reference: &str) -> Option<&'static str> {
    let path_part = if is_remote(reference) {
        reference.split(['?', '#']).next().unwrap_or(reference)
    } else {
        reference
    };
    let lower = path_part.to_ascii_lowercase();
    DOCUMENT_EXTENSIONS
        .iter()
        .copied()
        .find(|ext| lower.ends_with(ext))
}

fn document_extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let lower = content_type.to_ascii_lowercase();
    DOCUMENT_CONTENT_TYPES
        .iter()
        .find(|(ct, _)| lower.contains(ct))
        .map(|(_, ext)| *ext)
}

/// Parse a source list: one reference per line, `#` comments and blank lines skipped.
pub fn parse_source_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read a source list file. A missing or unreadable file yields no sources.
pub fn read_source_list(path: &Path) -> Vec<String> {
    if !path.exists() {
        debug!("No source list at {}", path.display());
        return Vec::new();
    }
    match fs::read_to_string(path) {
        Ok(text) => parse_source_list(&text),
        Err(e) => {
            warn!("Failed to read source list {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

pub struct SourceFetcher {
    http: Client,
    settings: FetchSettings,
    converter: Option<Arc<dyn DocumentConverter>>,
}

impl SourceFetcher {
    pub fn new(
        settings: FetchSettings,
        converter: Option<Arc<dyn DocumentConverter>>,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            settings,
            converter,
        })
    }

    /// Decide how to treat a reference. Remote references without a
    /// document extension get a HEAD probe; a failed probe means text.
    pub async fn classify(&self, reference: &str) -> SourceKind {
        let remote = is_remote(reference);
        let document = document_extension(reference).is_some()
            || (remote && self.probe_document_type(reference).await.is_some());

        match (remote, document) {
            (false, false) => SourceKind::LocalText,
            (false, true) => SourceKind::LocalDocument,
            (true, false) => SourceKind::RemoteText,
            (true, true) => SourceKind::RemoteDocument,
        }
    }

    /// Fetch one reference. Never fails: errors come back as embedded text.
    pub async fn fetch(&self, reference: &str) -> FetchResult {
        println!("Processing: {}", reference);

        let kind = self.classify(reference).await;
        debug!("Classified {} as {:?}", reference, kind);

        let outcome = match kind {
            SourceKind::LocalText => self.fetch_local_text(reference),
            SourceKind::LocalDocument => self.fetch_local_document(reference).await,
            SourceKind::RemoteText => self.fetch_remote_text(reference).await,
            SourceKind::RemoteDocument => self.fetch_remote_document(reference).await,
        };

        let result = FetchResult::from_outcome(reference, kind, outcome);
        if let Some(err) = &result.error {
            warn!("Source failed: {}", err);
        } else {
            info!("Fetched {} ({} chars)", reference, result.text.len());
        }
        result
    }

    async fn probe_document_type(&self, url: &str) -> Option<&'static str> {
        let response = match self
            .http
            .head(url)
            .timeout(self.settings.head_timeout())
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                debug!("HEAD probe failed for {}: {}", url, e);
                return None;
            }
        };

        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(document_extension_for_content_type)
    }

    fn fetch_local_text(&self, path: &str) -> Result<String, FetchError> {
        let file = Path::new(path);
        if !file.exists() {
            return Err(FetchError::NotFound(path.to_string()));
        }

        let text = fs::read_to_string(file).map_err(|e| FetchError::Io {
            path: path.to_string(),
            source: e,
        })?;

        let is_markup = file
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_ascii_lowercase();
                ext == "html" || ext == "htm"
            })
            .unwrap_or(false);

        if is_markup {
            Ok(html_to_markdown(&text))
        } else {
            Ok(text)
        }
    }

    async fn fetch_local_document(&self, path: &str) -> Result<String, FetchError> {
        let converter = self.converter()?;
        let file = Path::new(path);
        if !file.exists() {
            return Err(FetchError::NotFound(path.to_string()));
        }
        converter.convert(file).await
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self
            .http
            .get(url)
            .timeout(self.settings.fetch_timeout())
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn fetch_remote_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get(url).await?;
        let is_html_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase().contains("html"))
            .unwrap_or(false);

        let body = response.text().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        if is_html_type || looks_like_html(&body) {
            Ok(html_to_markdown(&body))
        } else {
            Ok(body)
        }
    }

    async fn fetch_remote_document(&self, url: &str) -> Result<String, FetchError> {
        let converter = self.converter()?;
        let response = self.get(url).await?;

        let suffix = document_extension(url)
            .or_else(|| {
                response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(document_extension_for_content_type)
            })
            .unwrap_or(".pdf");

        let bytes = response.bytes().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        // Removed when `temp` drops, on success and on every error path below
        let mut temp = tempfile::Builder::new()
            .prefix("grace-ctx-")
            .suffix(suffix)
            .tempfile()
            .map_err(|e| FetchError::Io {
                path: std::env::temp_dir().display().to_string(),
                source: e,
            })?;

        let temp_path = temp.path().display().to_string();
        if let Err(e) = temp.write_all(&bytes).and_then(|_| temp.flush()) {
            return Err(FetchError::Io {
                path: temp_path,
                source: e,
            });
        }

        debug!("Wrote {} bytes to {}", bytes.len(), temp.path().display());
        converter.convert(temp.path()).await
    }

    fn converter(&self) -> Result<&Arc<dyn DocumentConverter>, FetchError> {
        self.converter
            .as_ref()
            .ok_or_else(|| FetchError::ConverterUnavailable {
                command: self.settings.document_converter.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records the path it was handed and whether it existed at conversion time
    #[derive(Default)]
    struct FakeConverter {
        seen: Mutex<Vec<(PathBuf, bool)>>,
    }

    #[async_trait]
    impl DocumentConverter for FakeConverter {
        fn name(&self) -> &str {
            "fake"
        }

        async fn convert(&self, path: &Path) -> Result<String, FetchError> {
            let existed = path.exists();
            self.seen
                .lock()
                .unwrap()
                .push((path.to_path_buf(), existed));
            let len = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            Ok(format!("# Converted\n\n{} bytes", len))
        }
    }

    #[derive(Default)]
    struct FailingConverter {
        seen: Mutex<Option<PathBuf>>,
    }

    #[async_trait]
    impl DocumentConverter for FailingConverter {
        fn name(&self) -> &str {
            "failing"
        }

        async fn convert(&self, path: &Path) -> Result<String, FetchError> {
            *self.seen.lock().unwrap() = Some(path.to_path_buf());
            Err(FetchError::DocumentParse {
                path: path.display().to_string(),
                reason: "corrupt xref table".to_string(),
            })
        }
    }

    fn fetcher(converter: Option<Arc<dyn DocumentConverter>>) -> SourceFetcher {
        SourceFetcher::new(FetchSettings::default(), converter).unwrap()
    }

    #[test]
    fn parses_source_list() {
        let list = "# research sources\n\nhttps://example.com/a\n  notes/local.md  \n#skip\n";
        assert_eq!(
            parse_source_list(list),
            vec!["https://example.com/a".to_string(), "notes/local.md".to_string()]
        );
    }

    #[test]
    fn missing_source_list_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(read_source_list(&tmp.path().join("SOURCES.txt")).is_empty());
    }

    #[test]
    fn detects_document_extensions() {
        assert_eq!(document_extension("paper.PDF"), Some(".pdf"));
        assert_eq!(document_extension("https://x.org/a.pdf?dl=1"), Some(".pdf"));
        assert_eq!(document_extension("slides.pptx"), Some(".pptx"));
        assert_eq!(document_extension("https://x.org/pdf"), None);
        assert_eq!(document_extension("notes.md"), None);
    }

    #[tokio::test]
    async fn local_text_is_returned_verbatim() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.md");
        let content = "# Notes\n\n<b>not parsed</b> – ünïcode\n";
        fs::write(&path, content).unwrap();

        let result = fetcher(None).fetch(path.to_str().unwrap()).await;
        assert!(!result.is_error());
        assert_eq!(result.kind, SourceKind::LocalText);
        assert_eq!(result.text, content);
    }

    #[tokio::test]
    async fn missing_local_file_is_reported_as_content() {
        let result = fetcher(None).fetch("no/such/file.txt").await;
        assert!(result.is_error());
        assert!(matches!(result.error, Some(FetchError::NotFound(_))));
        assert!(result.text.starts_with("[ERROR]"));
        assert!(result.text.contains("no/such/file.txt"));
    }

    #[tokio::test]
    async fn local_html_is_normalized() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("page.html");
        fs::write(
            &path,
            "<html><body><h1>Law</h1><script>SCRIPT_MARKER</script><p>F = ma</p></body></html>",
        )
        .unwrap();

        let result = fetcher(None).fetch(path.to_str().unwrap()).await;
        assert_eq!(result.text, "# Law\n\nF = ma");
    }

    #[tokio::test]
    async fn document_without_converter_gets_advisory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("paper.pdf");
        fs::write(&path, b"%PDF-1.4").unwrap();

        let result = fetcher(None).fetch(path.to_str().unwrap()).await;
        assert_eq!(result.kind, SourceKind::LocalDocument);
        assert!(matches!(
            result.error,
            Some(FetchError::ConverterUnavailable { .. })
        ));
        assert!(result.text.contains("docling"));
    }

    #[tokio::test]
    async fn local_document_goes_through_converter() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("paper.pdf");
        fs::write(&path, b"%PDF-1.4").unwrap();

        let fake = Arc::new(FakeConverter::default());
        let result = fetcher(Some(fake.clone() as Arc<dyn DocumentConverter>))
            .fetch(path.to_str().unwrap())
            .await;
        assert_eq!(result.text, "# Converted\n\n8 bytes");
        assert_eq!(fake.seen.lock().unwrap()[0].0, path);
    }

    #[tokio::test]
    async fn remote_html_is_fetched_and_normalized() {
        let mut server = mockito::Server::new_async().await;
        let page = server
            .mock("GET", "/article")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html><body><nav>NAV_MARKER</nav><h2>Result</h2><p>It works.</p></body></html>")
            .create_async()
            .await;

        let url = format!("{}/article", server.url());
        let result = fetcher(None).fetch(&url).await;

        page.assert_async().await;
        assert_eq!(result.kind, SourceKind::RemoteText);
        assert_eq!(result.text, "## Result\n\nIt works.");
    }

    #[tokio::test]
    async fn remote_plain_text_is_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let _text = server
            .mock("GET", "/data.txt")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("x < y && y > z\n")
            .create_async()
            .await;

        let result = fetcher(None)
            .fetch(&format!("{}/data.txt", server.url()))
            .await;
        assert_eq!(result.text, "x < y && y > z\n");
    }

    #[tokio::test]
    async fn remote_error_status_is_embedded() {
        let mut server = mockito::Server::new_async().await;
        let _gone = server
            .mock("GET", "/gone")
            .with_status(404)
            .create_async()
            .await;

        let url = format!("{}/gone", server.url());
        let result = fetcher(None).fetch(&url).await;
        assert!(matches!(
            result.error,
            Some(FetchError::HttpStatus { status: 404, .. })
        ));
        assert!(result.text.starts_with("[ERROR]"));
        assert!(result.text.contains("404"));
    }

    #[tokio::test]
    async fn transport_failure_is_embedded() {
        // Port 1 is never listening
        let result = fetcher(None).fetch("http://127.0.0.1:1/unreachable").await;
        assert!(matches!(result.error, Some(FetchError::Transport { .. })));
        assert!(result.text.contains("127.0.0.1:1"));
    }

    #[tokio::test]
    async fn remote_document_uses_temp_file_and_cleans_up() {
        let mut server = mockito::Server::new_async().await;
        let _pdf = server
            .mock("GET", "/paper.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body(b"%PDF-1.7 fake body".to_vec())
            .create_async()
            .await;

        let fake = Arc::new(FakeConverter::default());
        let result = fetcher(Some(fake.clone() as Arc<dyn DocumentConverter>))
            .fetch(&format!("{}/paper.pdf", server.url()))
            .await;

        assert_eq!(result.kind, SourceKind::RemoteDocument);
        assert_eq!(result.text, "# Converted\n\n18 bytes");

        let seen = fake.seen.lock().unwrap();
        let (temp_path, existed) = &seen[0];
        assert!(existed, "temp file should exist during conversion");
        assert_eq!(temp_path.extension().unwrap(), "pdf");
        assert!(!temp_path.exists(), "temp file should be removed afterwards");
    }

    #[tokio::test]
    async fn head_probe_detects_document_without_extension() {
        let mut server = mockito::Server::new_async().await;
        let _head = server
            .mock("HEAD", "/download")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .create_async()
            .await;
        let _get = server
            .mock("GET", "/download")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body(b"%PDF".to_vec())
            .create_async()
            .await;

        let fake = Arc::new(FakeConverter::default());
        let result = fetcher(Some(fake.clone() as Arc<dyn DocumentConverter>))
            .fetch(&format!("{}/download", server.url()))
            .await;
        assert_eq!(result.kind, SourceKind::RemoteDocument);
        assert!(!result.is_error());
    }

    #[tokio::test]
    async fn failed_probe_falls_back_to_text() {
        let fetcher = fetcher(None);
        assert_eq!(
            fetcher.classify("http://127.0.0.1:1/page").await,
            SourceKind::RemoteText
        );
    }

    #[tokio::test]
    async fn converter_failure_still_removes_temp_file() {
        let mut server = mockito::Server::new_async().await;
        let _broken = server
            .mock("GET", "/broken.pdf")
            .with_status(200)
            .with_body(b"not a pdf".to_vec())
            .create_async()
            .await;

        let failing = Arc::new(FailingConverter::default());
        let result = fetcher(Some(failing.clone() as Arc<dyn DocumentConverter>))
            .fetch(&format!("{}/broken.pdf", server.url()))
            .await;
        assert!(matches!(
            result.error,
            Some(FetchError::DocumentParse { .. })
        ));
        assert!(result.text.contains("corrupt xref table"));

        let temp_path = failing.seen.lock().unwrap().clone().unwrap();
        assert!(!temp_path.exists(), "temp file should be removed on failure");
    }
}
