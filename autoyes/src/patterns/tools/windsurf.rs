//! Codeium Windsurf / Cascade CLI.

use crate::patterns::CategoryDefinition;

/// Create the windsurf category definition.
pub fn category() -> CategoryDefinition {
    CategoryDefinition::new("windsurf")
        .with_description("Codeium Windsurf / Cascade CLI")
        .with_command(["windsurf"])
        .with_pattern(r"Accept (?:all )?changes\s*\?")
        .with_pattern(r"Run this command\s*\?")
}
