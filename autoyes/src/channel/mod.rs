//! Channel layer: what happens to child output before detection.
//!
//! Holds the rolling output buffer, the response cooldown, visible-text
//! normalization and the low-level pattern matcher.

pub mod buffer;
mod cooldown;
mod matcher;
pub mod normalize;

pub use buffer::RollingBuffer;
pub use cooldown::CooldownClock;
pub use matcher::{CompiledPattern, PromptMatcher};
pub use normalize::{clean, clean_str};
