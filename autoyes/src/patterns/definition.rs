//! Category definition: one named group of prompt patterns.

/// A single registered prompt pattern.
///
/// `response` of `None` means "send the caller's configured default".
/// `Some("")` means just press Enter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEntry {
    /// Regex source string.
    pub source: String,

    /// Category the pattern belongs to.
    pub category: String,

    /// Canned response overriding the default reply.
    pub response: Option<String>,
}

/// A named group of patterns for one CLI tool (or the generic prompts).
#[derive(Debug, Clone)]
pub struct CategoryDefinition {
    /// Category name (e.g., "generic", "claude", "aider").
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Argument vector of the real binary, if the category wraps a tool.
    pub command: Option<Vec<String>>,

    /// Ordered pattern list.
    pub patterns: Vec<PatternEntry>,
}

impl CategoryDefinition {
    /// Create a new, empty category.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            command: None,
            patterns: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the real binary argument vector.
    pub fn with_command<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = Some(argv.into_iter().map(Into::into).collect());
        self
    }

    /// Add a pattern that replies with the caller's default response.
    pub fn with_pattern(self, source: impl Into<String>) -> Self {
        self.push(source.into(), None)
    }

    /// Add a pattern with a canned response.
    pub fn with_reply(self, source: impl Into<String>, response: impl Into<String>) -> Self {
        self.push(source.into(), Some(response.into()))
    }

    fn push(mut self, source: String, response: Option<String>) -> Self {
        self.patterns.push(PatternEntry {
            source,
            category: self.name.clone(),
            response,
        });
        self
    }

    /// The binary to run for this category, falling back to its name.
    pub fn binary(&self) -> Vec<String> {
        self.command
            .clone()
            .unwrap_or_else(|| vec![self.name.clone()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_records_category_on_entries() {
        let category = CategoryDefinition::new("demo")
            .with_description("demo tool")
            .with_pattern(r"\[y/n\]")
            .with_reply(r"\[yes/no\]", "yes");

        assert_eq!(category.patterns.len(), 2);
        assert!(category.patterns.iter().all(|p| p.category == "demo"));
        assert_eq!(category.patterns[0].response, None);
        assert_eq!(category.patterns[1].response.as_deref(), Some("yes"));
    }

    #[test]
    fn test_binary_falls_back_to_name() {
        let plain = CategoryDefinition::new("aider");
        assert_eq!(plain.binary(), vec!["aider"]);

        let wrapped = CategoryDefinition::new("copilot").with_command(["gh", "copilot"]);
        assert_eq!(wrapped.binary(), vec!["gh", "copilot"]);
    }
}
