//! OpenHands (formerly OpenDevin) agent.

use crate::patterns::CategoryDefinition;

/// Create the openhands category definition.
pub fn category() -> CategoryDefinition {
    CategoryDefinition::new("openhands")
        .with_description("OpenHands AI agent")
        .with_command(["openhands"])
        .with_pattern(r"Do you want to execute this action\s*\?")
        .with_pattern(r">\s*Approve")
}
