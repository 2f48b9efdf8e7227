//! Categorized prompt-pattern registry.
//!
//! Each tool (plus the tool-agnostic "generic" group) owns an ordered list of
//! `(regex, optional canned response)` entries. The registry is static data:
//! it is built once and never mutated. Runtime additions live in the
//! detector's custom overlay instead.

mod definition;
mod registry;
pub mod tools;

pub use definition::{CategoryDefinition, PatternEntry};
pub use registry::{ALL, CategoryRegistry, GENERIC};
