//! Builder for proxied sessions.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use super::config::SessionConfig;
use super::responder::AutoResponder;
use super::{SessionMode, SessionProxy, user_shell};
use crate::detector::PromptDetector;
use crate::error::Result;
use crate::patterns::CategoryRegistry;

/// Builder for constructing a [`SessionProxy`].
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use autoyes::session::SessionBuilder;
///
/// # async fn example() -> Result<(), autoyes::Error> {
/// let session = SessionBuilder::new(["claude"])
///     .category("claude")
///     .response("yes")
///     .cooldown(Duration::from_secs(1))
///     .spawn()?;
/// let code = session.run().await?;
/// # Ok(())
/// # }
/// ```
pub struct SessionBuilder {
    argv: Vec<String>,
    config: SessionConfig,
    registry: Option<Arc<CategoryRegistry>>,
    output: Option<Box<dyn Write + Send>>,
}

impl SessionBuilder {
    /// Create a builder for the given argument vector.
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            config: SessionConfig::default(),
            registry: None,
            output: None,
        }
    }

    /// Create a builder for the user's shell.
    pub fn shell() -> Self {
        Self::new([user_shell()])
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default response (default: "y").
    pub fn response(mut self, response: impl Into<String>) -> Self {
        self.config.response = response.into();
        self
    }

    /// Set the minimum delay between two responses.
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.config.cooldown = cooldown;
        self
    }

    /// Print a notice for every response.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Add a tool category.
    pub fn category(mut self, name: impl Into<String>) -> Self {
        self.config.categories.push(name.into());
        self
    }

    /// Add an extra regex pattern.
    pub fn pattern(mut self, source: impl Into<String>) -> Self {
        self.config.extra_patterns.push(source.into());
        self
    }

    /// Force a session mode.
    pub fn mode(mut self, mode: SessionMode) -> Self {
        self.config.mode = Some(mode);
        self
    }

    /// Forward this process's stdin to the child (default: true).
    pub fn attach_stdin(mut self, attach: bool) -> Self {
        self.config.attach_stdin = attach;
        self
    }

    /// Set how long to keep flushing output after the child exits.
    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.config.drain_timeout = timeout;
        self
    }

    /// Use a custom pattern registry instead of the built-in one.
    pub fn registry(mut self, registry: Arc<CategoryRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Send child output somewhere other than stdout.
    pub fn output(mut self, output: impl Write + Send + 'static) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    /// Build the detector and spawn the child.
    ///
    /// Unknown category names are skipped with a warning. Invalid extra
    /// patterns and spawn failures are errors. Must be called from within a
    /// Tokio runtime.
    pub fn spawn(self) -> Result<SessionProxy> {
        let registry = self.registry.unwrap_or_else(CategoryRegistry::builtin);
        let categories = registry.resolve_categories(&self.config.categories);
        let detector =
            PromptDetector::with_registry(registry, &categories, &self.config.extra_patterns)?;
        debug!(
            "starting {:?} with {} patterns from {:?}",
            self.argv,
            detector.len(),
            detector.categories()
        );

        let responder =
            AutoResponder::new(detector, self.config.response.clone(), self.config.cooldown)
                .with_verbose(self.config.verbose);
        let output = self.output.unwrap_or_else(|| Box::new(io::stdout()));

        SessionProxy::spawn(&self.argv, &self.config, responder, output)
    }
}
