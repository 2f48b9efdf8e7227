//! Immutable category registry, built once at startup.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use log::warn;

use super::definition::{CategoryDefinition, PatternEntry};
use super::tools;
use crate::error::PatternError;

/// Name of the category that is always loaded first.
pub const GENERIC: &str = "generic";

/// Pseudo category name that expands to every registered category.
pub const ALL: &str = "all";

static BUILTIN: LazyLock<Arc<CategoryRegistry>> =
    LazyLock::new(|| Arc::new(CategoryRegistry::builtin_categories()));

/// Ordered lookup from category name to its definition.
#[derive(Debug, Default, Clone)]
pub struct CategoryRegistry {
    categories: IndexMap<String, CategoryDefinition>,
}

impl CategoryRegistry {
    /// Build a registry from definitions, keeping their order.
    ///
    /// A later definition with an already used name replaces the earlier one.
    pub fn new(definitions: impl IntoIterator<Item = CategoryDefinition>) -> Self {
        let categories = definitions
            .into_iter()
            .map(|definition| (definition.name.clone(), definition))
            .collect();
        Self { categories }
    }

    /// The shared built-in registry.
    pub fn builtin() -> Arc<CategoryRegistry> {
        Arc::clone(&BUILTIN)
    }

    fn builtin_categories() -> Self {
        Self::new([
            tools::generic::category(),
            tools::claude::category(),
            tools::gemini::category(),
            tools::codex::category(),
            tools::copilot::category(),
            tools::cursor::category(),
            tools::grok::category(),
            tools::auggie::category(),
            tools::amp::category(),
            tools::aider::category(),
            tools::openhands::category(),
            tools::windsurf::category(),
            tools::qwen::category(),
            tools::amazonq::category(),
        ])
    }

    /// Get a category by name.
    pub fn get(&self, name: &str) -> Option<&CategoryDefinition> {
        self.categories.get(name)
    }

    /// Get a category by name, failing for unknown names.
    pub fn require(&self, name: &str) -> Result<&CategoryDefinition, PatternError> {
        self.get(name).ok_or_else(|| PatternError::UnknownCategory {
            name: name.to_string(),
        })
    }

    /// Check if a category is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    /// All category names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// All categories in registration order.
    pub fn categories(&self) -> impl Iterator<Item = &CategoryDefinition> {
        self.categories.values()
    }

    /// Sorted names of every tool category (everything but generic).
    pub fn assistant_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names().filter(|name| *name != GENERIC).collect();
        names.sort_unstable();
        names
    }

    /// Total number of patterns across all categories.
    pub fn pattern_count(&self) -> usize {
        self.categories.values().map(|c| c.patterns.len()).sum()
    }

    /// Collect the patterns of `names` in order, dropping repeated sources.
    ///
    /// Fails on the first unknown category name.
    pub fn patterns_for<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<&PatternEntry>, PatternError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for name in names {
            let category = self.require(name.as_ref())?;
            for entry in &category.patterns {
                if seen.insert(entry.source.as_str()) {
                    entries.push(entry);
                }
            }
        }
        Ok(entries)
    }

    /// Turn user-supplied category names into a loadable list.
    ///
    /// The result starts with "generic", keeps the requested order, drops
    /// duplicates and expands "all". Unknown names are logged and skipped so
    /// a typo does not abort the session.
    pub fn resolve_categories<S: AsRef<str>>(&self, requested: &[S]) -> Vec<String> {
        let mut resolved = vec![GENERIC.to_string()];
        let mut push = |name: &str| {
            if !resolved.iter().any(|known| known == name) {
                resolved.push(name.to_string());
            }
        };

        for name in requested {
            let name = name.as_ref();
            if name == ALL {
                self.names().for_each(&mut push);
            } else if self.contains(name) {
                push(name);
            } else {
                warn!(
                    "unknown CLI profile '{}', ignored. available: {}",
                    name,
                    self.assistant_names().join(", ")
                );
            }
        }
        resolved
    }

    /// Real binary argument vector for `profile`, or `[profile]` if undeclared.
    pub fn command_for(&self, profile: &str) -> Vec<String> {
        match self.get(profile) {
            Some(category) => category.binary(),
            None => vec![profile.to_string()],
        }
    }

    /// Map a wrap target (category name or its binary) to a tool category.
    ///
    /// Never resolves to "generic".
    pub fn resolve_profile(&self, name: &str) -> Option<&str> {
        if name != GENERIC {
            if let Some((key, _)) = self.categories.get_key_value(name) {
                return Some(key.as_str());
            }
        }
        self.categories
            .values()
            .filter(|category| category.name != GENERIC)
            .find(|category| {
                category
                    .command
                    .as_ref()
                    .and_then(|argv| argv.first())
                    .is_some_and(|binary| binary == name)
            })
            .map(|category| category.name.as_str())
    }
}
