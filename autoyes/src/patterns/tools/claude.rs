//! Anthropic Claude Code CLI.

use crate::patterns::CategoryDefinition;

/// Create the claude category definition.
pub fn category() -> CategoryDefinition {
    CategoryDefinition::new("claude")
        .with_description("Anthropic Claude Code CLI")
        .with_command(["claude"])
        .with_pattern(r">\s*1\.\s*Yes,?\s+I trust this folder")
        .with_pattern(r"Do you want to use this API key\s*\?")
        .with_pattern(r">\s*1\.\s*Yes")
        .with_reply(r"Press Enter to continue…", "")
        .with_pattern(r"❯\s*1\.\s*Dark mode\s*✔")
        .with_pattern(r"❯?\s*Yes,?\s+allow")
        .with_pattern(r">\s*Allow\s+(?:once|always)")
}
