// Configuration structs

use super::constants::*;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Network and document-conversion settings used by the source fetcher
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Timeout for the content-type probe (seconds)
    pub head_timeout_secs: u64,

    /// Timeout for the full GET (seconds)
    pub fetch_timeout_secs: u64,

    pub user_agent: String,

    /// External command that converts binary documents to Markdown
    pub document_converter: String,
}

impl FetchSettings {
    pub fn head_timeout(&self) -> Duration {
        Duration::from_secs(self.head_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            head_timeout_secs: DEFAULT_HEAD_TIMEOUT_SECS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            document_converter: DEFAULT_DOCUMENT_CONVERTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hidden working directory (artifacts in, generated context out).
    /// Chosen on the command line, never read from the file itself.
    #[serde(skip)]
    pub work_dir: PathBuf,

    /// Directory names pruned at every depth of the walk
    pub exclude_dirs: Vec<String>,

    /// File extensions (without the dot) never embedded as file entries
    pub skip_extensions: Vec<String>,

    /// RESEARCH source list
    pub sources_file: PathBuf,

    pub fetch: FetchSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            skip_extensions: DEFAULT_SKIP_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sources_file: PathBuf::from(DEFAULT_SOURCES_FILE),
            fetch: FetchSettings::default(),
        }
    }
}

impl Config {
    /// Config rooted at a specific working directory, all other values default
    pub fn with_work_dir(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            ..Self::default()
        }
    }

    pub fn knowledge_path(&self) -> PathBuf {
        self.work_dir.join(KNOWLEDGE_FILE)
    }

    pub fn architecture_path(&self) -> PathBuf {
        self.work_dir.join(ARCHITECTURE_FILE)
    }

    pub fn manual_rules_path(&self) -> PathBuf {
        self.work_dir.join(MANUAL_RULES_FILE)
    }

    /// Add extra exclusions from the command line, keeping the list free of duplicates
    pub fn extend_excludes<I, S>(&mut self, extra: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in extra {
            let name = name.into();
            if !self.exclude_dirs.contains(&name) {
                self.exclude_dirs.push(name);
            }
        }
    }
}
