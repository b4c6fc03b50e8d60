//! LinkedThoughts application layer
//!
//! Orchestration between views and the document graph.
//!
//! # Core Concepts
//!
//! - [`AppManager`]: sequences remote calls for scaffolding, pages, forks,
//!   feeds and speculative merges
//! - [`AppElements`]: the well-known per-user perspective tree, lazily
//!   created and deterministically addressed
//! - [`AppConfig`] / [`ConceptId`]: session identity and well-known tags
//!
//! # Example
//!
//! ```rust,ignore
//! use lt_app::{AppConfig, AppManager};
//! use lt_graph::GraphClient;
//! use lt_patterns::PatternRegistry;
//! use std::sync::Arc;
//!
//! let graph = Arc::new(GraphClient::new(
//!     Arc::new(PatternRegistry::with_defaults()),
//!     "alice",
//! ));
//! let app = AppManager::new(graph, &AppConfig::new("alice"));
//! app.check_structure().await?;
//! let section = app.section_at(0).await?;
//! let page = app.new_page(section).await?;
//! ```

#![warn(unreachable_pub)]

// Core modules
mod config;
mod elements;
mod error;
mod manager;

// Re-exports
pub use config::{AppConfig, ConceptId};
pub use elements::{AppElements, ElementPath, PathError};
pub use error::AppError;
pub use manager::AppManager;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
