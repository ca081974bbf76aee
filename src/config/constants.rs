// Project-wide constants
//
// File names and defaults shared by the loader, the assembler and the CLI.
// Import via `use crate::config::constants::*;`.

/// Hidden working directory holding prior-stage artifacts and generated output.
pub const DEFAULT_WORK_DIR: &str = ".grace";

/// Source root used when `--src` is not given.
pub const DEFAULT_SOURCE_ROOT: &str = "src";

/// Per-project configuration file, looked up inside the working directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Research output, consumed by ARCHITECT.
pub const KNOWLEDGE_FILE: &str = "KNOWLEDGE.md";

/// Architect output, consumed by DEVELOPER and REFACTOR.
pub const ARCHITECTURE_FILE: &str = "ARCHITECTURE.md";

/// Hand-written axioms that outrank every external source in RESEARCH.
pub const MANUAL_RULES_FILE: &str = "MANUAL_RULES.md";

/// One source reference per line; `#` comments and blank lines are ignored.
pub const DEFAULT_SOURCES_FILE: &str = "SOURCES.txt";

/// Mission file read by a bare `--mission-file`.
pub const DEFAULT_MISSION_FILE: &str = "TASK.md";

/// Timeout for the content-type probe issued before a remote fetch.
pub const DEFAULT_HEAD_TIMEOUT_SECS: u64 = 5;

/// Timeout for the full remote retrieval.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_USER_AGENT: &str = "Scientific-Crawler/1.0";

/// External command used to turn binary documents into Markdown.
pub const DEFAULT_DOCUMENT_CONVERTER: &str = "docling";

/// Directory names pruned from every walk.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    "venv",
    ".venv",
    "node_modules",
    "specs",
    ".idea",
    ".vscode",
    "target",
    DEFAULT_WORK_DIR,
];

/// Binary and asset extensions that are listed in the tree but never embedded.
pub const DEFAULT_SKIP_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tiff",
    // compiled artifacts
    "pyc", "pyo", "class", "o", "a", "obj", "rlib", "wasm",
    // executables and libraries
    "exe", "dll", "so", "dylib", "bin",
    // archives and documents
    "zip", "tar", "gz", "bz2", "xz", "7z", "jar", "pdf", "docx", "pptx", "xlsx",
    // media and fonts
    "mp3", "mp4", "wav", "mov", "woff", "woff2", "ttf", "otf", "eot",
];
