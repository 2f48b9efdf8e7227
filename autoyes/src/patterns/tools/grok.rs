//! xAI Grok CLI.

use crate::patterns::CategoryDefinition;

/// Create the grok category definition.
pub fn category() -> CategoryDefinition {
    CategoryDefinition::new("grok")
        .with_description("xAI Grok CLI")
        .with_command(["grok"])
        .with_pattern(r"^\s*1\.\s*Yes")
}
