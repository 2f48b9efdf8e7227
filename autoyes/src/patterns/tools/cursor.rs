//! Cursor Agent CLI (binary is `agent`).

use crate::patterns::CategoryDefinition;

/// Create the cursor category definition.
pub fn category() -> CategoryDefinition {
    CategoryDefinition::new("cursor")
        .with_description("Cursor Agent CLI")
        .with_command(["agent"])
        .with_pattern(r"→\s*Run\s+\(once\)\s+\(y\)(?:\s+\(enter\))?")
        .with_pattern(r"→\s*Run\s+\(always\)\s+\(a\)")
        .with_pattern(r"Skip\s+\(esc\s+or\s+n\)")
        .with_pattern(r"▶\s*\[a\]\s*Trust this workspace")
}
