//! Pattern matching utilities for prompt detection.

use regex::{Regex, RegexBuilder};

use crate::error::PatternError;

/// Trait for prompt matching - regex by default, extensible for custom parsers.
pub trait PromptMatcher: Send + Sync {
    /// Returns byte offset where match ends, or None if no match.
    fn find_match(&self, line: &str) -> Option<usize>;

    /// Check if the line matches the pattern.
    fn is_match(&self, line: &str) -> bool {
        self.find_match(line).is_some()
    }
}

/// Regex-based prompt matcher (the default implementation).
impl PromptMatcher for Regex {
    fn find_match(&self, line: &str) -> Option<usize> {
        self.find(line).map(|m| m.end())
    }
}

/// A compiled, case-insensitive prompt pattern with its canned response.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// The source string the pattern was compiled from.
    source: String,

    /// The compiled regex.
    regex: Regex,

    /// Reply that overrides the caller's default when this pattern matches.
    response: Option<String>,
}

impl CompiledPattern {
    /// Compile `source` case-insensitively.
    pub fn new(source: &str, response: Option<String>) -> Result<Self, PatternError> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map_err(|e| PatternError::InvalidPattern {
                source_text: source.to_string(),
                source: e,
            })?;

        Ok(Self {
            source: source.to_string(),
            regex,
            response,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    /// Get a reference to the underlying regex.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl PromptMatcher for CompiledPattern {
    fn find_match(&self, line: &str) -> Option<usize> {
        self.regex.find_match(line)
    }
}
