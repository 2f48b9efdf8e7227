//! # autoyes
//!
//! Run CLI tools under a pseudo-terminal proxy that answers their yes/no
//! confirmation prompts automatically.
//!
//! The proxy relays bytes between the child and the real terminal unchanged,
//! keeps a rolling window of recent output, and checks the last visible line
//! of that window against a prioritized set of prompt patterns. When a prompt
//! matches and the cooldown has elapsed, it writes the reply into the child's
//! input.
//!
//! ## Features
//!
//! - Pty-backed sessions with raw-mode passthrough and resize forwarding
//! - Pipe-backed fallback where no pty is available
//! - Tail-line detection with ANSI stripping and carriage-return overwrite
//! - Built-in pattern categories for common AI coding CLIs
//! - Explicit, documented pattern priority
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use autoyes::session::SessionConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), autoyes::Error> {
//!     let config = SessionConfig {
//!         categories: vec!["claude".into()],
//!         verbose: true,
//!         ..SessionConfig::default()
//!     };
//!     let code = autoyes::run_command(["claude", "fix the tests"], config).await?;
//!     std::process::exit(code);
//! }
//! ```

pub mod channel;
pub mod config;
pub mod detector;
pub mod error;
pub mod patterns;
pub mod session;

// Re-export main types for convenience
pub use config::Config;
pub use detector::{DetectionResult, PatternOrigin, PromptDetector};
pub use error::{Error, Result};
pub use patterns::{CategoryDefinition, CategoryRegistry, PatternEntry};
pub use session::{
    SESSION_ENV_VAR, SessionBuilder, SessionConfig, SessionMode, SessionProxy, run_command,
    run_shell,
};
