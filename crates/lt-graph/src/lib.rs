//! LinkedThoughts document graph
//!
//! In-memory, content-addressed document graph with mergeable perspectives.
//!
//! # Core Concepts
//!
//! - [`PerspectiveId`]: opaque address of a mutable document history
//! - [`GraphClient`]: session client with staged mutations, flush and diff
//! - [`LinkInterpreter`]: seam through which the service reads child links
//!   on opaque objects (implemented by pattern registries)
//! - [`RecursiveLineageMerge`]: folds one perspective tree into another,
//!   matching children by lineage and unioning semantic links
//! - [`GraphClient::clone_workspace`]: detached snapshot for speculative
//!   merges, cheap through structural sharing
//!
//! # Example
//!
//! ```rust,ignore
//! use lt_graph::{GraphClient, ExploreOptions};
//!
//! let client = GraphClient::new(registry, "alice");
//! let page = client.add_new_child(object, section_id).await?;
//! client.flush().await?;
//!
//! let feed = client.explore(&ExploreOptions::linked_to(concept.id)).await?;
//! ```

#![warn(unreachable_pub)]

// Core modules
mod access;
mod client;
mod concepts;
mod error;
mod id;
mod interpreter;
mod merge;
mod perspective;
mod search;

// Re-exports
pub use client::GraphClient;
pub use concepts::concept_id;
pub use error::GraphError;
pub use id::{ContentHash, IdError, PerspectiveId};
pub use interpreter::LinkInterpreter;
pub use merge::{MergeConfig, MergeOutcome, MergeStrategy, RecursiveLineageMerge};
pub use perspective::{
    AclEntry, DiffReport, HeadUpdate, LineageId, ParentAndChild, PermissionKind, Perspective,
    PerspectiveDetails, PerspectiveRecord,
};
pub use search::{ExploreOptions, ExploreResult};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures: a minimal interpreter over `{children, tags}`
    //! payloads and a client factory.

    use crate::id::PerspectiveId;
    use crate::interpreter::LinkInterpreter;
    use crate::GraphClient;
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[derive(Debug, Clone, Copy, Default)]
    pub(crate) struct TestInterpreter;

    impl LinkInterpreter for TestInterpreter {
        fn children(&self, object: &Value) -> Vec<PerspectiveId> {
            object
                .get("children")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default()
        }

        fn replace_children(&self, object: &Value, children: &[PerspectiveId]) -> Value {
            let mut out = object.clone();
            if let Value::Object(map) = &mut out {
                map.insert("children".to_string(), json!(children));
            }
            out
        }

        fn links_to(&self, object: &Value) -> Vec<PerspectiveId> {
            object
                .get("tags")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default()
        }

        fn replace_links_to(&self, object: &Value, links: &[PerspectiveId]) -> Value {
            let mut out = object.clone();
            if let Value::Object(map) = &mut out {
                map.insert("tags".to_string(), json!(links));
            }
            out
        }
    }

    pub(crate) fn node(children: &[PerspectiveId]) -> Value {
        json!({ "children": children })
    }

    pub(crate) fn tagged_node(children: &[PerspectiveId], tags: &[PerspectiveId]) -> Value {
        json!({ "children": children, "tags": tags })
    }

    pub(crate) fn test_client(user: &str) -> GraphClient {
        GraphClient::new(Arc::new(TestInterpreter), user)
    }
}
