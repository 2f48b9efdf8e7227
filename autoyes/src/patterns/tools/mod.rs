//! Built-in category tables, one module per tool.

pub mod aider;
pub mod amazonq;
pub mod amp;
pub mod auggie;
pub mod claude;
pub mod codex;
pub mod copilot;
pub mod cursor;
pub mod gemini;
pub mod generic;
pub mod grok;
pub mod openhands;
pub mod qwen;
pub mod windsurf;
