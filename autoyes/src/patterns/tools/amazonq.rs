//! Amazon Q Developer CLI (binary is `q`).

use crate::patterns::CategoryDefinition;

/// Create the amazonq category definition.
pub fn category() -> CategoryDefinition {
    CategoryDefinition::new("amazonq")
        .with_description("Amazon Q Developer CLI")
        .with_command(["q"])
        .with_pattern(r"Do you approve this action\s*\?")
        .with_pattern(r"Accept\s+suggestion\s*\?")
}
