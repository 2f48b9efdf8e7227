//! Error types for autoyes.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for autoyes operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Pattern registry / detector errors
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// Session (pty, pipes, child process) errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Persisted configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Pattern registry and detector errors.
#[derive(Error, Debug)]
pub enum PatternError {
    /// Requested category is not part of the registry
    #[error("Unknown category '{name}'")]
    UnknownCategory { name: String },

    /// Pattern source failed to compile
    #[error("Invalid regex pattern '{source_text}': {source}")]
    InvalidPattern {
        source_text: String,
        #[source]
        source: regex::Error,
    },
}

/// Session errors (spawning and streaming).
#[derive(Error, Debug)]
pub enum SessionError {
    /// No program was given
    #[error("No command specified")]
    EmptyCommand,

    /// The child process could not be created
    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Pseudo-terminal allocation failed while pty mode was forced
    #[error("Pseudo-terminal unavailable: {0}")]
    PtyUnavailable(nix::Error),

    /// Unexpected I/O error while relaying bytes
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unexpected system call failure
    #[error("System error: {0}")]
    Sys(#[from] nix::Error),
}

/// Persisted configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No per-user configuration directory on this platform
    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    /// Reading or writing the config file failed
    #[error("Config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config file is not valid JSON for this schema
    #[error("Config file {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias using autoyes's Error.
pub type Result<T> = std::result::Result<T, Error>;
