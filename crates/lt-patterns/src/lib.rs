//! LinkedThoughts object patterns
//!
//! Domain object shapes and the recognizers that let the graph service
//! interpret them.
//!
//! # Core Concepts
//!
//! - [`Home`], [`Dashboard`], [`Section`], [`TextNode`], [`TaggedTextNode`]:
//!   the stored object shapes
//! - [`Pattern`]: duck-typed shape recognition that never fails
//! - [`HasChildren`] / [`HasLinksTo`]: attachable link capabilities,
//!   separating structural children from set-like `isA` relations
//! - [`PatternRegistry`]: fixed-priority dispatch, and the crate's
//!   implementation of the graph's `LinkInterpreter` seam
//!
//! # Example
//!
//! ```rust,ignore
//! use lt_patterns::{PatternRegistry, Recognized};
//!
//! let registry = PatternRegistry::with_defaults();
//! match registry.recognize(&object) {
//!     Recognized::Section(section) => render_section(section),
//!     Recognized::Unrecognized(_) => render_fallback(),
//!     other => render_node(other),
//! }
//! ```

#![warn(unreachable_pub)]

// Core modules
mod pattern;
mod registry;
mod schemas;

// Re-exports
pub use pattern::{
    DashboardPattern, HasChildren, HasLinksTo, HomePattern, Pattern, SectionPattern,
    TaggedTextNodePattern, TextNodePattern,
};
pub use registry::{PatternRegistry, Recognized};
pub use schemas::{Dashboard, Home, NodeMeta, Section, TaggedTextNode, TextNode, TextType};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
