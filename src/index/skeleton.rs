// Skeleton extraction - keeps only the declarative surface of a source file
//
// This is a line filter, not a parser: a line survives when its trimmed form
// starts with one of DECLARATION_PREFIXES, or when it contains a docstring
// delimiter anywhere (so a `"""` inside an ordinary string literal is kept
// too). No brace or indentation tracking.

/// Prefixes that introduce definitions, imports, decorators or async items.
pub const DECLARATION_PREFIXES: &[&str] = &[
    // Python
    "def ",
    "class ",
    "import ",
    "from ",
    "@",
    "async ",
    // Rust
    "pub ",
    "fn ",
    "struct ",
    "enum ",
    "trait ",
    "impl ",
    "use ",
    "mod ",
    "#[",
    "///",
    "//!",
    // JavaScript / TypeScript
    "export ",
    "function ",
    "interface ",
];

/// Docstring delimiters matched anywhere in a line.
pub const DOCSTRING_DELIMITERS: &[&str] = &["\"\"\"", "'''"];

pub fn is_skeleton_line(line: &str) -> bool {
    let trimmed = line.trim();
    DECLARATION_PREFIXES.iter().any(|p| trimmed.starts_with(p))
        || DOCSTRING_DELIMITERS.iter().any(|d| line.contains(d))
}

/// Reduce file content to its skeleton lines, joined with `\n`.
///
/// Idempotent: every kept line is kept again on a second pass.
pub fn extract_skeleton(content: &str) -> String {
    content
        .split('\n')
        .filter(|line| is_skeleton_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}
