//! Prompt detection on the tail line of terminal output.
//!
//! Only the last non-blank line of the normalized output is inspected: a
//! prompt that was followed by more output has already been answered or
//! skipped, so only the line the cursor sits on can still be waiting.
//!
//! # Priority
//!
//! Patterns are tried in a fixed order and the first match wins:
//!
//! 1. the "generic" category,
//! 2. tool categories, in the order they were loaded,
//! 3. custom patterns, always last, even when a category is loaded later.
//!
//! A source string is registered once per detector. When two categories carry
//! the same source, the earlier registration wins and keeps its canned
//! response.

mod result;

pub use result::{DetectionResult, PatternOrigin};

use std::sync::Arc;

use log::debug;

use crate::channel::{CompiledPattern, PromptMatcher, clean};
use crate::error::PatternError;
use crate::patterns::{CategoryRegistry, GENERIC};

#[derive(Debug, Clone)]
struct RegisteredPattern {
    compiled: CompiledPattern,
    origin: PatternOrigin,
}

/// Detects interactive prompts awaiting input.
#[derive(Debug, Clone)]
pub struct PromptDetector {
    registry: Arc<CategoryRegistry>,

    /// Loaded categories, deduplicated, generic first.
    categories: Vec<String>,

    /// Patterns from loaded categories, in priority order.
    patterns: Vec<RegisteredPattern>,

    /// Custom overlay, evaluated after every category pattern.
    custom: Vec<RegisteredPattern>,
}

impl PromptDetector {
    /// Build a detector over the built-in registry.
    ///
    /// "generic" is always loaded first; `categories` follow in order and
    /// `extra_patterns` go into the custom overlay. Unknown categories and
    /// invalid regexes are errors.
    pub fn new<C, P>(categories: &[C], extra_patterns: &[P]) -> Result<Self, PatternError>
    where
        C: AsRef<str>,
        P: AsRef<str>,
    {
        Self::with_registry(CategoryRegistry::builtin(), categories, extra_patterns)
    }

    /// Build a detector with only the generic category.
    pub fn generic() -> Result<Self, PatternError> {
        Self::new::<&str, &str>(&[], &[])
    }

    /// Build a detector over a specific registry.
    pub fn with_registry<C, P>(
        registry: Arc<CategoryRegistry>,
        categories: &[C],
        extra_patterns: &[P],
    ) -> Result<Self, PatternError>
    where
        C: AsRef<str>,
        P: AsRef<str>,
    {
        let mut detector = Self {
            registry,
            categories: Vec::new(),
            patterns: Vec::new(),
            custom: Vec::new(),
        };

        if detector.registry.contains(GENERIC) {
            detector.load_category(GENERIC)?;
        }
        for name in categories {
            detector.load_category(name.as_ref())?;
        }
        for source in extra_patterns {
            detector.add_pattern(source.as_ref(), None)?;
        }

        debug!(
            "detector ready: categories={:?}, {} patterns",
            detector.categories,
            detector.len()
        );
        Ok(detector)
    }

    /// Load every pattern of `name` that is not registered yet.
    ///
    /// Returns how many patterns were added. Loading the same category twice
    /// adds nothing the second time.
    pub fn load_category(&mut self, name: &str) -> Result<usize, PatternError> {
        let registry = Arc::clone(&self.registry);
        let category = registry.require(name)?;
        let origin = if name == GENERIC {
            PatternOrigin::Generic
        } else {
            PatternOrigin::Category(name.to_string())
        };

        let mut added = 0;
        for entry in &category.patterns {
            if self.is_registered(&entry.source, entry.response.as_deref()) {
                continue;
            }
            self.patterns.push(RegisteredPattern {
                compiled: CompiledPattern::new(&entry.source, entry.response.clone())?,
                origin: origin.clone(),
            });
            added += 1;
        }

        if !self.categories.iter().any(|loaded| loaded == name) {
            self.categories.push(name.to_string());
        }
        Ok(added)
    }

    /// Register a custom pattern at runtime.
    ///
    /// Returns `false` if the source was already registered.
    pub fn add_pattern(
        &mut self,
        source: &str,
        response: Option<String>,
    ) -> Result<bool, PatternError> {
        if self.is_registered(source, response.as_deref()) {
            return Ok(false);
        }
        self.custom.push(RegisteredPattern {
            compiled: CompiledPattern::new(source, response)?,
            origin: PatternOrigin::Custom,
        });
        Ok(true)
    }

    fn is_registered(&self, source: &str, response: Option<&str>) -> bool {
        let Some(existing) = self.registered().find(|p| p.compiled.source() == source) else {
            return false;
        };
        if existing.compiled.response() != response {
            debug!(
                "pattern {:?} already registered by {} with response {:?}; keeping it",
                source,
                existing.origin,
                existing.compiled.response()
            );
        }
        true
    }

    fn registered(&self) -> impl Iterator<Item = &RegisteredPattern> {
        self.patterns.iter().chain(self.custom.iter())
    }

    /// Check whether the tail of `raw_text` is a prompt waiting for input.
    pub fn detect(&self, raw_text: &str) -> Option<DetectionResult> {
        self.detect_bytes(raw_text.as_bytes())
    }

    /// [`detect`](Self::detect) for raw terminal bytes.
    pub fn detect_bytes(&self, raw: &[u8]) -> Option<DetectionResult> {
        let text = clean(raw);
        let line = tail_line(&text)?;
        self.match_line(line)
    }

    /// Match one already-normalized line against all patterns in priority order.
    pub fn match_line(&self, line: &str) -> Option<DetectionResult> {
        self.registered()
            .find(|p| p.compiled.is_match(line))
            .map(|p| DetectionResult {
                matched_pattern: p.compiled.source().to_string(),
                suggested_response: p.compiled.response().map(str::to_string),
                origin: p.origin.clone(),
            })
    }

    /// All registered pattern sources, in priority order.
    pub fn pattern_strings(&self) -> Vec<&str> {
        self.registered().map(|p| p.compiled.source()).collect()
    }

    /// Loaded categories, generic first.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.patterns.len() + self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The last non-blank line of normalized text.
fn tail_line(text: &str) -> Option<&str> {
    let last = text.trim_end().rsplit('\n').next()?;
    if last.trim().is_empty() {
        None
    } else {
        Some(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::CategoryDefinition;

    fn detector(categories: &[&str]) -> PromptDetector {
        PromptDetector::new::<&str, &str>(categories, &[]).unwrap()
    }

    #[test]
    fn test_empty_and_blank_input_never_match() {
        let registry = CategoryRegistry::builtin();
        let all: Vec<&str> = registry.names().collect();
        for categories in [&[][..], &["claude"][..], &all[..]] {
            let det = detector(categories);
            assert!(det.detect("").is_none());
            assert!(det.detect("   \n   ").is_none());
            assert!(det.detect("   \n   \n").is_none());
        }
    }

    #[test]
    fn test_basic_prompt() {
        let det = PromptDetector::generic().unwrap();
        let result = det.detect("Continue? [y/n]").unwrap();
        assert_eq!(result.matched_pattern, r"\[y/n\]");
        assert_eq!(result.suggested_response, None);
        assert_eq!(result.origin, PatternOrigin::Generic);
        assert_eq!(result.response_or("y"), "y");
    }

    #[test]
    fn test_canned_response() {
        let det = PromptDetector::generic().unwrap();
        let result = det.detect("Overwrite config? [yes/no]").unwrap();
        assert_eq!(result.response_or("y"), "yes");
    }

    #[test]
    fn test_prompt_not_on_last_line_is_stale() {
        let det = PromptDetector::generic().unwrap();
        let text = "Question: continue? [y/n]\nUser chose yes.\nProcessing...\n";
        assert!(det.detect(text).is_none());
    }

    #[test]
    fn test_trailing_blank_lines_ignored() {
        let det = PromptDetector::generic().unwrap();
        assert!(det.detect("building...\nProceed? [Y/n]\n\n   \n").is_some());
    }

    #[test]
    fn test_regular_output_does_not_match() {
        let det = PromptDetector::generic().unwrap();
        assert!(det.detect("Setting y/n flag in config\nDone.\n").is_none());
    }

    #[test]
    fn test_styling_does_not_change_match() {
        let det = PromptDetector::generic().unwrap();
        let plain = det.detect("Continue? [y/n]").unwrap();
        let styled = det.detect("\x1b[1;33mContinue? [y/n]\x1b[0m").unwrap();
        assert_eq!(plain, styled);
    }

    #[test]
    fn test_case_insensitive() {
        let det = PromptDetector::generic().unwrap();
        assert!(det.detect("ARE YOU SURE?").is_some());
    }

    #[test]
    fn test_carriage_return_overwrite_hides_old_prompt() {
        let det = PromptDetector::generic().unwrap();
        assert!(det.detect("Continue? [y/n]\rworking").is_none());
        assert!(det.detect("working\rContinue? [y/n]").is_some());
    }

    #[test]
    fn test_detect_bytes_matches_detect() {
        let det = PromptDetector::generic().unwrap();
        assert_eq!(
            det.detect_bytes(b"Remove package? (y/n)"),
            det.detect("Remove package? (y/n)")
        );
    }

    #[test]
    fn test_tool_categories() {
        let det = detector(&["claude"]);
        assert!(det.detect(" > 1. Yes, I trust this folder").is_some());

        let det = detector(&["gemini"]);
        assert!(det.detect("│ ● 1. Allow once").is_some());

        let det = detector(&["codex"]);
        assert!(det.detect("> 1. Approve and run now").is_some());

        let det = detector(&["copilot"]);
        assert!(det.detect("│ ❯ 1. Yes, proceed").is_some());
    }

    #[test]
    fn test_cursor_approval_dialog() {
        let det = detector(&["cursor"]);
        let text = " Waiting for approval...\n │ Run this command?\n │  → Run (once) (y) (enter)\n │    Skip (esc or n)      ";
        let result = det.detect(text).unwrap();
        assert_eq!(result.origin, PatternOrigin::Category("cursor".into()));
    }

    #[test]
    fn test_generic_always_first() {
        let det = detector(&["claude"]);
        assert_eq!(det.categories(), ["generic", "claude"]);
        assert_eq!(det.pattern_strings()[0], r"\[y/n\]");
    }

    #[test]
    fn test_unknown_category_is_an_error() {
        let err = PromptDetector::new::<&str, &str>(&["nonexistent"], &[]).unwrap_err();
        assert!(matches!(err, PatternError::UnknownCategory { .. }));
    }

    #[test]
    fn test_extra_patterns_deduplicated() {
        let det = PromptDetector::new::<&str, &str>(&[], &["p", "p"]).unwrap();
        let count = det.pattern_strings().iter().filter(|s| **s == "p").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_load_category_is_idempotent() {
        let mut det = PromptDetector::generic().unwrap();
        assert!(det.detect("> 1. Yes, I trust this folder").is_none());

        let added = det.load_category("claude").unwrap();
        assert!(added > 0);
        let len = det.len();
        assert_eq!(det.load_category("claude").unwrap(), 0);
        assert_eq!(det.len(), len);
        assert_eq!(det.categories(), ["generic", "claude"]);

        let mut sources = det.pattern_strings();
        let total = sources.len();
        sources.sort_unstable();
        sources.dedup();
        assert_eq!(sources.len(), total);

        assert!(det.detect("> 1. Yes, I trust this folder").is_some());
    }

    #[test]
    fn test_add_pattern_runtime() {
        let mut det = PromptDetector::generic().unwrap();
        assert!(det.detect("do_thing?").is_none());
        assert!(det.add_pattern(r"do_thing\?", Some("ok".into())).unwrap());
        assert!(!det.add_pattern(r"do_thing\?", None).unwrap());

        let result = det.detect("do_thing?").unwrap();
        assert_eq!(result.origin, PatternOrigin::Custom);
        assert_eq!(result.response_or("y"), "ok");
        assert!(det.pattern_strings().contains(&r"do_thing\?"));
    }

    #[test]
    fn test_invalid_extra_pattern() {
        let err = PromptDetector::new::<&str, &str>(&[], &["(unclosed"]).unwrap_err();
        assert!(matches!(err, PatternError::InvalidPattern { .. }));
    }

    #[test]
    fn test_custom_patterns_stay_behind_later_categories() {
        let registry = Arc::new(CategoryRegistry::new([
            CategoryDefinition::new("generic").with_pattern("never-matches-anything"),
            CategoryDefinition::new("tool").with_reply(r"ready\?", "from-tool"),
        ]));
        let mut det =
            PromptDetector::with_registry(registry, &[] as &[&str], &[r"ready\?"]).unwrap();
        assert_eq!(det.detect("ready?").unwrap().origin, PatternOrigin::Custom);

        det.add_pattern(r"go\?", Some("from-custom".into())).unwrap();
        det.load_category("tool").unwrap();

        // the tool's copy of "ready\?" collapsed into the existing custom entry
        assert_eq!(det.detect("ready?").unwrap().origin, PatternOrigin::Custom);
        assert_eq!(det.pattern_strings().last(), Some(&r"go\?"));
    }

    #[test]
    fn test_overlapping_categories_first_loaded_wins() {
        let registry = Arc::new(CategoryRegistry::new([
            CategoryDefinition::new("generic"),
            CategoryDefinition::new("a").with_reply(r"pick one", "1"),
            CategoryDefinition::new("b").with_reply(r"pick one", "2"),
        ]));
        let det = PromptDetector::with_registry(
            Arc::clone(&registry),
            &["a", "b"],
            &[] as &[&str],
        )
        .unwrap();
        assert_eq!(det.detect("pick one").unwrap().response_or("y"), "1");

        let det =
            PromptDetector::with_registry(registry, &["b", "a"], &[] as &[&str]).unwrap();
        assert_eq!(det.detect("pick one").unwrap().response_or("y"), "2");
    }

    #[test]
    fn test_all_categories_loadable() {
        let registry = CategoryRegistry::builtin();
        let all: Vec<&str> = registry.names().collect();
        let det = detector(&all);
        assert_eq!(det.categories().len(), all.len());
        assert!(det.detect("Continue? [y/n]").is_some());
    }

    #[test]
    fn test_tail_line() {
        assert_eq!(tail_line("a\nb\n\n"), Some("b"));
        assert_eq!(tail_line("  indented"), Some("  indented"));
        assert_eq!(tail_line(" \n\t\n"), None);
    }
}
