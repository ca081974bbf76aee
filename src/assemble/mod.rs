// Context assembler - builds the per-mode hand-off document
//
// One pass, one output file: template, mission, optional prior artifact,
// then the mode payload (fetched sources or indexed code). Missing inputs
// are skipped; only failures creating/writing the output are errors.

pub mod templates;
pub mod writer;

pub use writer::{escape_attr, escape_cdata, ContextWriter};

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::fetch::{read_source_list, SourceFetcher};
use crate::index::{DirectoryIndexer, EntryKind};

/// Workflow stage selecting the template and payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Mode {
    #[value(name = "RESEARCH")]
    Research,
    #[value(name = "ARCHITECT")]
    Architect,
    #[value(name = "DEVELOPER")]
    Developer,
    #[value(name = "REFACTOR")]
    Refactor,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Research => "RESEARCH",
            Mode::Architect => "ARCHITECT",
            Mode::Developer => "DEVELOPER",
            Mode::Refactor => "REFACTOR",
        }
    }

    /// `context_<mode>.xml`
    pub fn output_file_name(&self) -> String {
        format!("context_{}.xml", self.as_str().to_ascii_lowercase())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs of a single run
#[derive(Debug, Clone)]
pub struct AssemblyRequest {
    pub mode: Mode,
    pub mission: Option<String>,
    pub source_roots: Vec<PathBuf>,
    /// Treat the codebase as legacy (full code for ARCHITECT, refactoring rules)
    pub legacy: bool,
}

pub struct ContextAssembler {
    config: Config,
    indexer: DirectoryIndexer,
    fetcher: SourceFetcher,
}

impl ContextAssembler {
    pub fn new(config: Config, fetcher: SourceFetcher) -> Self {
        let indexer = DirectoryIndexer::from_config(&config);
        Self {
            config,
            indexer,
            fetcher,
        }
    }

    pub fn output_path(&self, mode: Mode) -> PathBuf {
        self.config.work_dir.join(mode.output_file_name())
    }

    /// Generate the document for `request` and return its path.
    pub async fn assemble(&self, request: &AssemblyRequest) -> Result<PathBuf> {
        let mode = request.mode;
        println!("Building context for: {}", mode);
        println!("Sources: {}", display_roots(&request.source_roots));
        if request.legacy && mode != Mode::Research {
            println!("Legacy mode active: injecting refactoring prompts");
        }

        fs::create_dir_all(&self.config.work_dir).with_context(|| {
            format!(
                "Failed to create working directory: {}",
                self.config.work_dir.display()
            )
        })?;

        let output_path = self.output_path(mode);
        let file = File::create(&output_path)
            .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;
        let mut writer = ContextWriter::new(BufWriter::new(file));

        self.write_document(&mut writer, request)
            .await
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        writer
            .finish()
            .with_context(|| format!("Failed to flush {}", output_path.display()))?;

        println!("Generated: {}", output_path.display());
        Ok(output_path)
    }

    async fn write_document<W: Write>(
        &self,
        writer: &mut ContextWriter<W>,
        request: &AssemblyRequest,
    ) -> Result<()> {
        writer.open_root(request.mode)?;
        writer.raw(&templates::instructions(request.mode, request.legacy, &self.config))?;

        match request.mission.as_deref() {
            Some(mission) if !mission.trim().is_empty() => {
                writer.cdata_block(1, "mission", &[], mission)?;
            }
            _ => debug!("No mission text for this run"),
        }

        match request.mode {
            Mode::Research => self.write_research(writer).await,
            Mode::Architect => self.write_architect(writer, request),
            Mode::Developer | Mode::Refactor => self.write_source_code(writer, request),
        }
    }

    async fn write_research<W: Write>(&self, writer: &mut ContextWriter<W>) -> Result<()> {
        if let Some(rules) = read_artifact(&self.config.manual_rules_path()) {
            writer.cdata_block(1, "user_logic", &[("type", "axiom")], &rules)?;
        }

        writer.open(1, "raw_sources", &[])?;
        let sources = read_source_list(&self.config.sources_file);
        info!("{} source(s) listed in {}", sources.len(), self.config.sources_file.display());

        for source in &sources {
            // Fully resolved before anything is embedded
            let result = self.fetcher.fetch(source).await;
            writer.cdata_block(2, "article", &[("source", source.as_str())], &result.text)?;
        }
        writer.close(1, "raw_sources")?;
        Ok(())
    }

    fn write_architect<W: Write>(
        &self,
        writer: &mut ContextWriter<W>,
        request: &AssemblyRequest,
    ) -> Result<()> {
        if let Some(knowledge) = read_artifact(&self.config.knowledge_path()) {
            writer.cdata_block(1, "research_specs", &[], &knowledge)?;
        }

        let (kind, type_attr) = if request.legacy {
            (EntryKind::Full, "legacy_full")
        } else {
            (EntryKind::Skeleton, "skeleton")
        };

        writer.open(1, "current_codebase", &[("type", type_attr)])?;
        self.write_tree_and_files(writer, &request.source_roots, kind)?;
        writer.close(1, "current_codebase")?;
        Ok(())
    }

    fn write_source_code<W: Write>(
        &self,
        writer: &mut ContextWriter<W>,
        request: &AssemblyRequest,
    ) -> Result<()> {
        if let Some(architecture) = read_artifact(&self.config.architecture_path()) {
            writer.cdata_block(1, "architecture_context", &[], &architecture)?;
        }

        writer.open(1, "source_code", &[])?;
        self.write_tree_and_files(writer, &request.source_roots, EntryKind::Full)?;
        writer.close(1, "source_code")?;
        Ok(())
    }

    fn write_tree_and_files<W: Write>(
        &self,
        writer: &mut ContextWriter<W>,
        roots: &[PathBuf],
        kind: EntryKind,
    ) -> Result<()> {
        let tree = self.indexer.render_tree(roots);
        writer.cdata_block(2, "tree", &[], &tree)?;

        let entries = self.indexer.collect_entries(roots, kind);
        info!("Embedding {} file(s) as {:?}", entries.len(), kind);
        for entry in &entries {
            let path = entry.path.display().to_string();
            writer.cdata_block(2, "file", &[("path", path.as_str())], &entry.content)?;
        }
        Ok(())
    }
}

/// Read a prior-stage artifact; absent or blank files count as missing.
pub fn read_artifact(path: &Path) -> Option<String> {
    if !path.exists() {
        debug!("No artifact at {}", path.display());
        return None;
    }
    match fs::read_to_string(path) {
        Ok(content) if !content.trim().is_empty() => {
            info!("Loaded {}", path.display());
            Some(content)
        }
        Ok(_) => None,
        Err(e) => {
            debug!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

/// Mission text: explicit text wins, otherwise the mission file if present.
pub fn resolve_mission(text: Option<String>, mission_file: Option<&Path>) -> Option<String> {
    text.or_else(|| mission_file.and_then(read_artifact))
}

fn display_roots(roots: &[PathBuf]) -> String {
    roots
        .iter()
        .map(|r| r.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
