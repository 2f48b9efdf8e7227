//! Detection result types.

use std::fmt;

/// Where a registered pattern came from.
///
/// Variants are ordered by matching priority: generic patterns are tried
/// first, then tool categories in the order they were loaded, then custom
/// patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternOrigin {
    /// The always-loaded "generic" category.
    Generic,

    /// A tool category, by name.
    Category(String),

    /// A user-supplied pattern (construction-time extra or `add_pattern`).
    Custom,
}

impl fmt::Display for PatternOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternOrigin::Generic => f.write_str("generic"),
            PatternOrigin::Category(name) => f.write_str(name),
            PatternOrigin::Custom => f.write_str("custom"),
        }
    }
}

/// A prompt found on the tail line of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    /// Source string of the pattern that matched.
    pub matched_pattern: String,

    /// Canned response of that pattern, if it has one.
    pub suggested_response: Option<String>,

    /// Where the matching pattern was registered from.
    pub origin: PatternOrigin,
}

impl DetectionResult {
    /// The text to send: the canned response, or `default` when there is none.
    pub fn response_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.suggested_response.as_deref().unwrap_or(default)
    }
}
