//! Google Gemini CLI.

use crate::patterns::CategoryDefinition;

/// Create the gemini category definition.
pub fn category() -> CategoryDefinition {
    CategoryDefinition::new("gemini")
        .with_description("Google Gemini CLI")
        .with_command(["gemini"])
        .with_pattern(r"│\s*●?\s*1\.\s*(?:Yes,?\s+)?[Aa]llow once")
        .with_pattern(r"│\s*●?\s*1\.\s*Yes")
        .with_pattern(r"│\s*●?\s*2\.\s*[Aa]llow for this session")
        .with_pattern(r"│\s*●?\s*3\.\s*[Aa]lways allow")
}
