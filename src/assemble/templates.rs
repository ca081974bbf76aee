// Mode instruction templates
//
// Emitted verbatim at the top of the generated document. These are trusted
// fixed text, so they are not CDATA-escaped; element names mentioned in
// the prose are entity-escaped to keep the document well-formed.
// `{output_path}` is filled with the artifact the stage should produce.

use super::writer::escape_attr;
use super::Mode;
use crate::config::Config;

const OUTPUT_PATH: &str = "{output_path}";

pub const RESEARCH_PROMPT: &str = r#"
  <meta_instructions role="RESEARCHER">
    <goal>Distill information into a strict scientific specification (O-M-I).</goal>
    <output_format>Markdown file named '{output_path}'</output_format>
    <rules>
      1. PRIORITIZE &lt;user_logic&gt; (Manual Rules) over external sources. These are the axioms.
      2. Ignore marketing fluff. Focus on algorithms, math, and physics.
      3. STRUCTURE: For each phenomenon, use the O-M-I pattern:
         - Observation: The real-world phenomenon.
         - Model: The mathematical formula (LaTeX preferred) or logic rule.
         - Implementation: How to represent this in code (variables, constraints).
      4. Sources marked [ERROR] could not be retrieved. Say so instead of guessing their content.
    </rules>
  </meta_instructions>
"#;

pub const ARCHITECT_PROMPT: &str = r#"
  <meta_instructions role="ARCHITECT">
    <goal>Design the software architecture based on MISSION and KNOWLEDGE.</goal>
    <output_format>Markdown file named '{output_path}'</output_format>
    <rules>
      1. Analyze the &lt;mission&gt; and &lt;research_specs&gt;.
      2. Create a high-level dependency graph.
      3. DEFINE CONTRACTS: For every major module, write the interface.
      4. Use 'SKELETON' mode: Describe functions but do not implement logic.
    </rules>
  </meta_instructions>
"#;

pub const DEVELOPER_PROMPT: &str = r#"
  <meta_instructions role="DEVELOPER">
    <goal>Implement the code based on ARCHITECTURE and CONTRACTS.</goal>
    <methodology>GRACE Framework + AAG (Actor-Action-Goal)</methodology>
    <rules>
      1. STRICTLY follow the signatures defined in &lt;architecture_context&gt;.
      2. BEFORE every function, write an AAG comment.
      3. Do NOT hallucinate new features. Stick to the plan.
    </rules>
  </meta_instructions>
"#;

pub const REFACTOR_PROMPT: &str = r#"
  <meta_instructions role="REFACTORER">
    <goal>Move the existing code toward the target ARCHITECTURE without changing behaviour.</goal>
    <methodology>GRACE Framework + AAG (Actor-Action-Goal)</methodology>
    <rules>
      1. Work from &lt;source_code&gt;; every change must keep current behaviour observable from outside.
      2. Follow the migration path in &lt;architecture_context&gt; when one is present.
      3. Refactor in small, reviewable steps and name the step you are on.
    </rules>
  </meta_instructions>
"#;

/// Appended to ARCHITECT when the codebase is treated as legacy
pub const LEGACY_ARCHITECT_RULES: &str = r#"
  <legacy_mode_active>TRUE</legacy_mode_active>
  <legacy_rules>
    1. AUDIT: The &lt;current_codebase&gt; is LEGACY (Non-AAG compliant).
    2. STRATEGY: Do not just overwrite. Design a "Refactoring Plan" or "Adapter Layer".
    3. Identify "God Classes" to break down into Actors.
    4. Output a migration path in ARCHITECTURE.md: "Current State -> Refactoring Steps -> Target AAG State".
  </legacy_rules>
"#;

/// Appended to DEVELOPER (with --legacy) and always to REFACTOR
pub const LEGACY_DEVELOPER_RULES: &str = r#"
  <legacy_mode_active>TRUE</legacy_mode_active>
  <legacy_rules>
    1. REFACTORING: You are converting legacy code to AAG.
    2. PRESERVE LOGIC: Ensure the original business logic from &lt;source_code&gt; is kept, but wrapped in AAG structures.
    3. If a file is too large, split it.
  </legacy_rules>
"#;

/// Full instruction block for a mode, pointing at the artifacts under the
/// configured working directory.
pub fn instructions(mode: Mode, legacy: bool, config: &Config) -> String {
    let (base, legacy_rules) = match mode {
        Mode::Research => (RESEARCH_PROMPT, None),
        Mode::Architect => (ARCHITECT_PROMPT, Some(LEGACY_ARCHITECT_RULES)),
        Mode::Developer => (DEVELOPER_PROMPT, Some(LEGACY_DEVELOPER_RULES)),
        Mode::Refactor => (REFACTOR_PROMPT, Some(LEGACY_DEVELOPER_RULES)),
    };

    let base = match mode {
        Mode::Research => fill_output_path(base, &config.knowledge_path().display().to_string()),
        Mode::Architect => {
            fill_output_path(base, &config.architecture_path().display().to_string())
        }
        _ => base.to_string(),
    };

    let legacy = legacy || mode == Mode::Refactor;
    match legacy_rules {
        Some(rules) if legacy => format!("{}{}", base, rules),
        _ => base,
    }
}

fn fill_output_path(template: &str, path: &str) -> String {
    template.replace(OUTPUT_PATH, &escape_attr(path))
}
