/// User-facing strings for agents-code.
///
/// Kept as constants in one place so wording stays consistent between the
/// prompt, confirmations, and tests.
pub const CONSENT_EXPLAIN: &str = "agents-code rewrites {} so Claude Code reads AGENTS.md instead of CLAUDE.md.\nThe original file is left untouched; a patched copy is written next to it.";
pub const CONSENT_QUESTION: &str = "Proceed with patching? (y/N): ";

pub const MODE_SET: &str = "Mode set to {}";

/// Helper function for single argument formatting
pub fn format_string(template: &str, arg: &dyn std::fmt::Display) -> String {
    template.replace("{}", &arg.to_string())
}
