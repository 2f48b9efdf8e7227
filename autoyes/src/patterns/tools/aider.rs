//! Aider AI coding assistant.

use crate::patterns::CategoryDefinition;

/// Create the aider category definition.
pub fn category() -> CategoryDefinition {
    CategoryDefinition::new("aider")
        .with_description("Aider AI coding assistant")
        .with_command(["aider"])
        .with_pattern(r"\(Y\)es/\(N\)o")
        .with_pattern(r"Add .+ to the chat\?")
        .with_pattern(r"Run shell command\?")
        .with_pattern(r"Apply edit to\b.*\?")
        .with_pattern(r"Create new file\b.*\?")
        .with_pattern(r"Attempt to fix lint errors\?")
        .with_pattern(r"Drop .+ from the chat\?")
}
