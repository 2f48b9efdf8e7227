//! Sourcegraph Amp CLI.

use crate::patterns::CategoryDefinition;

/// Create the amp category definition.
pub fn category() -> CategoryDefinition {
    CategoryDefinition::new("amp")
        .with_description("Sourcegraph Amp CLI")
        .with_command(["amp"])
        .with_pattern(r"^\s{0,4}Approve\s")
}
