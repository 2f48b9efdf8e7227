//! Runtime session configuration.

use std::time::Duration;

use super::SessionMode;

/// Default reply when the matched pattern has no canned response.
pub const DEFAULT_RESPONSE: &str = "y";

/// Default minimum delay between two auto-responses.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(500);

/// Configuration for one proxied session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Text sent when the matched pattern has no canned response.
    pub response: String,

    /// Minimum time between two auto-responses.
    pub cooldown: Duration,

    /// Print a notice to the terminal for every auto-response.
    pub verbose: bool,

    /// Requested tool categories. Unknown names are skipped with a warning.
    pub categories: Vec<String>,

    /// Extra regex patterns, evaluated after every category pattern.
    pub extra_patterns: Vec<String>,

    /// Forced session mode. `None` tries a pty and falls back to pipes.
    pub mode: Option<SessionMode>,

    /// Forward the invoking process's standard input to the child.
    pub attach_stdin: bool,

    /// Upper bound on one multiplexed wait.
    pub poll_interval: Duration,

    /// How long to keep flushing output after the child exits.
    pub drain_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            response: DEFAULT_RESPONSE.to_string(),
            cooldown: DEFAULT_COOLDOWN,
            verbose: false,
            categories: Vec::new(),
            extra_patterns: Vec::new(),
            mode: None,
            attach_stdin: true,
            poll_interval: Duration::from_millis(50),
            drain_timeout: Duration::from_secs(2),
        }
    }
}
