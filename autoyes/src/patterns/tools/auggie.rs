//! Augment Code Auggie CLI.

use crate::patterns::CategoryDefinition;

/// Create the auggie category definition.
pub fn category() -> CategoryDefinition {
    CategoryDefinition::new("auggie")
        .with_description("Augment Code Auggie CLI")
        .with_command(["auggie"])
        .with_pattern(r"\[Y\]\s*Enable indexing")
}
