//! Alibaba Qwen Code CLI.

use crate::patterns::CategoryDefinition;

/// Create the qwen category definition.
pub fn category() -> CategoryDefinition {
    CategoryDefinition::new("qwen")
        .with_description("Alibaba Qwen Code CLI")
        .with_command(["qwen"])
        .with_pattern(r">\s*1\.\s*Yes")
        .with_pattern(r"Approve execution\s*\?")
}
