//! Well-known concept perspectives
//!
//! Concepts are semantic tags ("blogpost", "bloghome") represented as
//! perspectives so objects can point at them through `isA` relations and
//! search can find everything tagged with one. They are service-owned and
//! derived deterministically: the same concept name always resolves to the
//! same perspective.

use crate::client::GraphClient;
use crate::error::GraphError;
use crate::id::PerspectiveId;
use crate::perspective::{
    AclEntry, LineageId, Perspective, PerspectiveDetails, PerspectiveRecord,
};
use serde_json::json;

/// Derive the well-known id of a concept
#[inline]
#[must_use]
pub fn concept_id(name: &str) -> PerspectiveId {
    PerspectiveId::derive(format!("concept/{name}").as_bytes())
}

impl GraphClient {
    /// Resolve a concept's well-known perspective, materializing it lazily
    ///
    /// Deterministic: the same name always yields the same perspective
    /// reference. Concept perspectives are publicly readable and never
    /// updatable by sessions.
    ///
    /// # Errors
    /// Returns error if the concept payload cannot be hashed
    pub async fn concept_perspective(&self, name: &str) -> Result<Perspective, GraphError> {
        let id = concept_id(name);
        let mut state = self.state.write().await;
        if state.get(&id).is_none() {
            let record = PerspectiveRecord::new(
                json!({ "concept": name }),
                LineageId::derive(&format!("concept/{name}")),
                "",
            )?
            .with_acl(AclEntry {
                delegate: false,
                guardian: None,
                public_read: true,
                public_write: false,
            });
            state.committed.insert(id, record);
            tracing::debug!(concept = name, id = %id.short(), "materialized concept");
        }
        Ok(Perspective {
            id,
            details: PerspectiveDetails { can_update: false },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_client;

    #[tokio::test]
    async fn same_name_same_perspective() {
        let client = test_client("alice");
        let first = client.concept_perspective("blogpost").await.unwrap();
        let second = client.concept_perspective("blogpost").await.unwrap();
        assert_eq!(first, second);
        assert!(!first.details.can_update);
    }

    #[tokio::test]
    async fn distinct_names_distinct_perspectives() {
        let client = test_client("alice");
        let post = client.concept_perspective("blogpost").await.unwrap();
        let home = client.concept_perspective("bloghome").await.unwrap();
        assert_ne!(post.id, home.id);
    }

    #[tokio::test]
    async fn concepts_are_not_session_mutable() {
        let client = test_client("alice");
        let concept = client.concept_perspective("blogpost").await.unwrap();
        let result = client
            .update_data(concept.id, json!({ "concept": "hijacked" }))
            .await;
        assert!(matches!(result, Err(GraphError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn materialization_leaves_no_pending_state() {
        let client = test_client("alice");
        client.concept_perspective("blogpost").await.unwrap();
        assert!(client.diff().await.is_empty());
    }
}
