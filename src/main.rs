// grace-ctx - context bundler for staged LLM workflows
// Main entry point

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

use grace_ctx::assemble::resolve_mission;
use grace_ctx::config::constants::{DEFAULT_MISSION_FILE, DEFAULT_SOURCE_ROOT, DEFAULT_WORK_DIR};
use grace_ctx::config::load_config;
use grace_ctx::fetch::detect_converter;
use grace_ctx::{AssemblyRequest, ContextAssembler, Mode, SourceFetcher};

#[derive(Parser)]
#[command(
    name = "grace-ctx",
    about = "GRACE context generator - bundle prompts, mission, sources and code into one document",
    version
)]
struct Cli {
    /// Workflow stage
    #[arg(value_enum, ignore_case = true)]
    mode: Mode,

    /// Mission text, embedded verbatim
    #[arg(short, long, required_unless_present = "mission_file")]
    mission: Option<String>,

    /// Read the mission from a file instead (bare flag reads TASK.md)
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_MISSION_FILE)]
    mission_file: Option<PathBuf>,

    /// Source roots to index, in order
    #[arg(long, num_args = 1.., default_value = DEFAULT_SOURCE_ROOT)]
    src: Vec<PathBuf>,

    /// Treat the codebase as legacy (full code for ARCHITECT, refactoring rules)
    #[arg(long)]
    legacy: bool,

    /// Working directory for artifacts and generated output
    #[arg(long, default_value = DEFAULT_WORK_DIR)]
    work_dir: PathBuf,

    /// Extra directory names to exclude
    #[arg(long, num_args = 1..)]
    exclude: Vec<String>,

    /// Source list for RESEARCH (overrides config)
    #[arg(long)]
    sources: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut config = load_config(&cli.work_dir)?;
    config.extend_excludes(cli.exclude);
    if let Some(sources) = cli.sources {
        config.sources_file = sources;
    }

    // Probed once; only RESEARCH ever fetches documents
    let converter = if cli.mode == Mode::Research {
        let converter = detect_converter(&config.fetch.document_converter).await;
        if converter.is_none() {
            warn!(
                "'{}' not found; document sources will be embedded as advisories",
                config.fetch.document_converter
            );
        }
        converter
    } else {
        None
    };

    let fetcher = SourceFetcher::new(config.fetch.clone(), converter)?;
    let request = AssemblyRequest {
        mode: cli.mode,
        mission: resolve_mission(cli.mission, cli.mission_file.as_deref()),
        source_roots: cli.src,
        legacy: cli.legacy,
    };

    let assembler = ContextAssembler::new(config, fetcher);
    assembler.assemble(&request).await?;

    Ok(())
}
