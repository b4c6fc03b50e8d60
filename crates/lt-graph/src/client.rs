//! Graph client with staged mutations
//!
//! [`GraphClient`] is the session-facing handle to the document graph:
//! - reads resolve staged state first, then committed state
//! - writes are staged until [`GraphClient::flush`] commits them in order
//! - [`GraphClient::clone_workspace`] snapshots the current view into a
//!   detached client for speculative work (persistent maps keep the copy
//!   cheap through structural sharing)

use crate::error::GraphError;
use crate::id::PerspectiveId;
use crate::interpreter::LinkInterpreter;
use crate::perspective::{
    AclEntry, DiffReport, HeadUpdate, LineageId, Perspective, PerspectiveDetails,
    PerspectiveRecord,
};
use im::{HashMap as PMap, Vector as PVector};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A buffered write, visible to this client before flush
#[derive(Debug, Clone)]
pub(crate) struct StagedEntry {
    /// Record as it would read after commit
    pub(crate) record: PerspectiveRecord,
    /// Whether the perspective is absent from committed state
    pub(crate) is_new: bool,
}

/// Full client state: committed records plus the staged buffer
#[derive(Debug, Clone, Default)]
pub(crate) struct ClientState {
    pub(crate) committed: PMap<PerspectiveId, PerspectiveRecord>,
    pub(crate) staged: PMap<PerspectiveId, StagedEntry>,
    /// First-staged order, preserved across re-staging of the same id
    pub(crate) staged_order: PVector<PerspectiveId>,
}

impl ClientState {
    /// Resolve a record in the staged-over-committed view
    pub(crate) fn get(&self, id: &PerspectiveId) -> Option<&PerspectiveRecord> {
        self.staged
            .get(id)
            .map(|entry| &entry.record)
            .or_else(|| self.committed.get(id))
    }

    /// All ids visible in the view
    pub(crate) fn view_ids(&self) -> Vec<PerspectiveId> {
        let mut ids: Vec<PerspectiveId> = self.committed.keys().copied().collect();
        for id in self.staged.keys() {
            if !self.committed.contains_key(id) {
                ids.push(*id);
            }
        }
        ids
    }

    fn stage(&mut self, id: PerspectiveId, record: PerspectiveRecord) {
        let is_new = match self.staged.get(&id) {
            Some(existing) => existing.is_new,
            None => {
                self.staged_order.push_back(id);
                !self.committed.contains_key(&id)
            }
        };
        self.staged.insert(id, StagedEntry { record, is_new });
    }
}

/// Session-facing client over the in-memory document graph
///
/// One client per session; orchestrated call chains stage writes through it
/// and commit with a single flush. Independent call sites are not
/// coordinated beyond the ordering their own `await` chains provide.
#[derive(Debug)]
pub struct GraphClient {
    interpreter: Arc<dyn LinkInterpreter>,
    user_id: String,
    pub(crate) state: RwLock<ClientState>,
}

impl GraphClient {
    /// Create a client for the given session user
    #[must_use]
    pub fn new(interpreter: Arc<dyn LinkInterpreter>, user_id: impl Into<String>) -> Self {
        Self {
            interpreter,
            user_id: user_id.into(),
            state: RwLock::new(ClientState::default()),
        }
    }

    /// Session user id
    #[inline]
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Registered object interpreter
    #[inline]
    #[must_use]
    pub fn interpreter(&self) -> &Arc<dyn LinkInterpreter> {
        &self.interpreter
    }

    /// Resolve a perspective's id and session-visible details
    ///
    /// # Errors
    /// `GraphError::PerspectiveNotFound` if the id does not resolve
    pub async fn get_perspective(&self, id: PerspectiveId) -> Result<Perspective, GraphError> {
        let state = self.state.read().await;
        let record = state
            .get(&id)
            .ok_or(GraphError::PerspectiveNotFound(id))?;
        let can_update = self.can_update(&state, id, record);
        Ok(Perspective {
            id,
            details: PerspectiveDetails { can_update },
        })
    }

    /// Current object payload of a perspective (staged state visible)
    ///
    /// # Errors
    /// `GraphError::PerspectiveNotFound` if the id does not resolve
    pub async fn get_perspective_data(&self, id: PerspectiveId) -> Result<Value, GraphError> {
        let state = self.state.read().await;
        state
            .get(&id)
            .map(|record| record.object.clone())
            .ok_or(GraphError::PerspectiveNotFound(id))
    }

    /// Full record, for in-crate collaborators (search, merge)
    pub(crate) async fn record(
        &self,
        id: PerspectiveId,
    ) -> Result<PerspectiveRecord, GraphError> {
        let state = self.state.read().await;
        state
            .get(&id)
            .cloned()
            .ok_or(GraphError::PerspectiveNotFound(id))
    }

    /// Stage a brand new perspective owned by the session user
    ///
    /// # Errors
    /// Returns error if the payload cannot be hashed
    pub async fn new_perspective(&self, object: Value) -> Result<PerspectiveId, GraphError> {
        let id = PerspectiveId::unique();
        let record = PerspectiveRecord::new(object, LineageId::unique(), &self.user_id)?;
        let mut state = self.state.write().await;
        state.stage(id, record);
        tracing::debug!(id = %id.short(), "staged new perspective");
        Ok(id)
    }

    /// Stage a new perspective at a caller-chosen (typically derived) id
    ///
    /// Used for well-known scaffolding whose ids must be findable without a
    /// directory. Lineage derives from the id, so re-creation on another
    /// device converges on the same document.
    ///
    /// # Errors
    /// `GraphError::PerspectiveExists` if the id is already taken
    pub async fn new_perspective_with_id(
        &self,
        id: PerspectiveId,
        object: Value,
        guardian: Option<PerspectiveId>,
    ) -> Result<(), GraphError> {
        let mut state = self.state.write().await;
        if state.get(&id).is_some() {
            return Err(GraphError::PerspectiveExists(id));
        }
        let record = PerspectiveRecord::new(
            object,
            LineageId::derive(&id.to_string()),
            &self.user_id,
        )?
        .with_acl(AclEntry::delegating(guardian));
        state.stage(id, record);
        tracing::debug!(id = %id.short(), "staged well-known perspective");
        Ok(())
    }

    /// Stage a head update on an existing perspective
    ///
    /// # Errors
    /// - `GraphError::PerspectiveNotFound` if the id does not resolve
    /// - `GraphError::PermissionDenied` if the session may not mutate it
    pub async fn update_data(&self, id: PerspectiveId, object: Value) -> Result<(), GraphError> {
        let mut state = self.state.write().await;
        let mut record = state
            .get(&id)
            .cloned()
            .ok_or(GraphError::PerspectiveNotFound(id))?;
        if !self.can_update(&state, id, &record) {
            return Err(GraphError::PermissionDenied(id));
        }
        record.replace_object(object)?;
        state.stage(id, record);
        Ok(())
    }

    /// Create a new perspective and attach it under a parent
    ///
    /// The child's policy delegates to the parent. Attachment appends; the
    /// parent's existing children are preserved in order.
    ///
    /// # Errors
    /// Propagates resolution and permission failures for the parent
    pub async fn add_new_child(
        &self,
        object: Value,
        parent: PerspectiveId,
    ) -> Result<PerspectiveId, GraphError> {
        let id = PerspectiveId::unique();
        {
            let mut state = self.state.write().await;
            if state.get(&parent).is_none() {
                return Err(GraphError::PerspectiveNotFound(parent));
            }
            let record = PerspectiveRecord::new(object, LineageId::unique(), &self.user_id)?
                .with_acl(AclEntry::delegating(Some(parent)));
            state.stage(id, record);
        }
        self.add_existing_child(id, parent).await?;
        Ok(id)
    }

    /// Attach an existing perspective under a parent (append)
    ///
    /// # Errors
    /// - `GraphError::PerspectiveNotFound` if child or parent do not resolve
    /// - `GraphError::PermissionDenied` if the parent is not mutable
    pub async fn add_existing_child(
        &self,
        child: PerspectiveId,
        parent: PerspectiveId,
    ) -> Result<(), GraphError> {
        let mut state = self.state.write().await;
        if state.get(&child).is_none() {
            return Err(GraphError::PerspectiveNotFound(child));
        }
        let mut record = state
            .get(&parent)
            .cloned()
            .ok_or(GraphError::PerspectiveNotFound(parent))?;
        if !self.can_update(&state, parent, &record) {
            return Err(GraphError::PermissionDenied(parent));
        }
        let mut children = self.interpreter.children(&record.object);
        children.push(child);
        let object = self.interpreter.replace_children(&record.object, &children);
        record.replace_object(object)?;
        state.stage(parent, record);
        tracing::debug!(child = %child.short(), parent = %parent.short(), "attached child");
        Ok(())
    }

    /// Stage an independent fork of an existing perspective
    ///
    /// The fork's initial content equals the source's current content and
    /// its lineage is preserved; history and ownership are independent from
    /// here on. The fork is not attached anywhere by this call.
    ///
    /// # Errors
    /// `GraphError::PerspectiveNotFound` if the source does not resolve
    pub async fn fork_perspective(
        &self,
        source: PerspectiveId,
        owner: Option<&str>,
        guardian: Option<PerspectiveId>,
    ) -> Result<PerspectiveId, GraphError> {
        let mut state = self.state.write().await;
        let source_record = state
            .get(&source)
            .cloned()
            .ok_or(GraphError::PerspectiveNotFound(source))?;
        let id = PerspectiveId::unique();
        let record = PerspectiveRecord::new(
            source_record.object,
            source_record.lineage,
            owner.unwrap_or(&self.user_id),
        )?
        .with_acl(AclEntry::delegating(guardian));
        state.stage(id, record);
        tracing::debug!(source = %source.short(), fork = %id.short(), "staged fork");
        Ok(id)
    }

    /// Commit staged mutations in first-staged order
    ///
    /// A flush with nothing pending is a no-op, so deferred-flush call
    /// chains compose with a caller's own flush.
    ///
    /// # Returns
    /// Number of perspectives committed
    pub async fn flush(&self) -> Result<usize, GraphError> {
        let mut state = self.state.write().await;
        if state.staged_order.is_empty() {
            return Ok(0);
        }
        let order: Vec<PerspectiveId> = state.staged_order.iter().copied().collect();
        let mut committed = 0usize;
        for id in order {
            if let Some(entry) = state.staged.get(&id).cloned() {
                state.committed.insert(id, entry.record);
                committed += 1;
            }
        }
        state.staged = PMap::new();
        state.staged_order = PVector::new();
        tracing::debug!(committed, "flushed staged mutations");
        Ok(committed)
    }

    /// Staged mutations relative to committed state
    ///
    /// Updates whose staged head equals the committed head are not
    /// reported.
    pub async fn diff(&self) -> DiffReport {
        let state = self.state.read().await;
        let mut report = DiffReport::default();
        for id in state.staged_order.iter() {
            let Some(entry) = state.staged.get(id) else {
                continue;
            };
            if entry.is_new {
                report.new_perspectives.push(*id);
            } else {
                let old_head = state.committed.get(id).map(|record| record.head);
                if old_head != Some(entry.record.head) {
                    report.updates.push(HeadUpdate {
                        perspective_id: *id,
                        old_head,
                        new_head: entry.record.head,
                    });
                }
            }
        }
        report
    }

    /// Snapshot the current view into a detached workspace client
    ///
    /// The workspace sees committed and staged state as its own committed
    /// base, starts with an empty staged buffer, and never writes back to
    /// this client. Structural sharing makes the snapshot cheap.
    pub async fn clone_workspace(&self) -> GraphClient {
        let state = self.state.read().await;
        let mut committed = state.committed.clone();
        for id in state.staged_order.iter() {
            if let Some(entry) = state.staged.get(id) {
                committed.insert(*id, entry.record.clone());
            }
        }
        GraphClient {
            interpreter: Arc::clone(&self.interpreter),
            user_id: self.user_id.clone(),
            state: RwLock::new(ClientState {
                committed,
                staged: PMap::new(),
                staged_order: PVector::new(),
            }),
        }
    }

    /// Whether the session may mutate the record
    pub(crate) fn can_update(
        &self,
        state: &ClientState,
        id: PerspectiveId,
        record: &PerspectiveRecord,
    ) -> bool {
        if !record.owner.is_empty() && record.owner == self.user_id {
            return true;
        }
        crate::access::resolve_acl(state, id)
            .map(|acl| acl.public_write)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{node, tagged_node, test_client};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn staged_state_is_visible_before_flush() {
        let client = test_client("alice");
        let id = client.new_perspective(node(&[])).await.unwrap();

        let data = client.get_perspective_data(id).await.unwrap();
        assert_eq!(data, node(&[]));
    }

    #[tokio::test]
    async fn flush_commits_and_is_idempotent() {
        let client = test_client("alice");
        client.new_perspective(node(&[])).await.unwrap();

        assert_eq!(client.flush().await.unwrap(), 1);
        assert_eq!(client.flush().await.unwrap(), 0);
        assert!(client.diff().await.is_empty());
    }

    #[tokio::test]
    async fn add_existing_child_appends() {
        let client = test_client("alice");
        let a = client.new_perspective(node(&[])).await.unwrap();
        let b = client.new_perspective(node(&[])).await.unwrap();
        let parent = client.new_perspective(node(&[a])).await.unwrap();

        client.add_existing_child(b, parent).await.unwrap();

        let data = client.get_perspective_data(parent).await.unwrap();
        assert_eq!(data, node(&[a, b]));
    }

    #[tokio::test]
    async fn add_new_child_preserves_existing_children() {
        let client = test_client("alice");
        let first = client.new_perspective(node(&[])).await.unwrap();
        let parent = client.new_perspective(node(&[first])).await.unwrap();

        let second = client.add_new_child(node(&[]), parent).await.unwrap();

        let data = client.get_perspective_data(parent).await.unwrap();
        assert_eq!(data, node(&[first, second]));
    }

    #[tokio::test]
    async fn add_child_to_missing_parent_fails() {
        let client = test_client("alice");
        let orphan = PerspectiveId::derive(b"nowhere");
        let result = client.add_new_child(node(&[]), orphan).await;
        assert!(matches!(result, Err(GraphError::PerspectiveNotFound(_))));
    }

    #[tokio::test]
    async fn fork_copies_content_and_lineage() {
        let client = test_client("alice");
        let source = client.new_perspective(tagged_node(&[], &[])).await.unwrap();
        let fork = client.fork_perspective(source, None, None).await.unwrap();

        assert_ne!(source, fork);
        let source_record = client.record(source).await.unwrap();
        let fork_record = client.record(fork).await.unwrap();
        assert_eq!(source_record.object, fork_record.object);
        assert_eq!(source_record.lineage, fork_record.lineage);
    }

    #[tokio::test]
    async fn fork_owner_override() {
        let client = test_client("alice");
        let source = client.new_perspective(node(&[])).await.unwrap();
        let fork = client
            .fork_perspective(source, Some("bob"), None)
            .await
            .unwrap();
        assert_eq!(client.record(fork).await.unwrap().owner, "bob");
    }

    #[tokio::test]
    async fn diff_reports_new_and_updated() {
        let client = test_client("alice");
        let existing = client.new_perspective(node(&[])).await.unwrap();
        client.flush().await.unwrap();

        let child = client.new_perspective(node(&[])).await.unwrap();
        client.add_existing_child(child, existing).await.unwrap();

        let diff = client.diff().await;
        assert_eq!(diff.new_perspectives, vec![child]);
        assert_eq!(diff.updates.len(), 1);
        assert_eq!(diff.updates[0].perspective_id, existing);
    }

    #[tokio::test]
    async fn clone_workspace_is_detached() {
        let client = test_client("alice");
        let id = client.new_perspective(node(&[])).await.unwrap();
        client.flush().await.unwrap();

        let workspace = client.clone_workspace().await;
        let child = workspace.new_perspective(node(&[])).await.unwrap();
        workspace.add_existing_child(child, id).await.unwrap();

        // the original never sees the workspace's writes
        assert!(client.diff().await.is_empty());
        assert_eq!(client.get_perspective_data(id).await.unwrap(), node(&[]));
        assert!(workspace.diff().await.has_updates());
    }

    #[tokio::test]
    async fn update_requires_ownership_or_grant() {
        let alice = test_client("alice");
        let open = alice.new_perspective(node(&[])).await.unwrap();
        let locked = alice.new_perspective(node(&[])).await.unwrap();
        alice.flush().await.unwrap();
        alice
            .set_public_permissions(open, crate::PermissionKind::Write, true)
            .await
            .unwrap();

        // same view, different session user
        let workspace = alice.clone_workspace().await;
        let bob = GraphClient {
            interpreter: Arc::clone(workspace.interpreter()),
            user_id: "bob".to_string(),
            state: workspace.state,
        };

        let denied = bob.update_data(locked, node(&[])).await;
        assert!(matches!(denied, Err(GraphError::PermissionDenied(_))));
        assert!(bob.update_data(open, node(&[])).await.is_ok());
    }

    #[tokio::test]
    async fn well_known_id_cannot_be_taken_twice() {
        let client = test_client("alice");
        let id = PerspectiveId::derive(b"app/alice/home");
        client
            .new_perspective_with_id(id, node(&[]), None)
            .await
            .unwrap();
        let again = client.new_perspective_with_id(id, node(&[]), None).await;
        assert!(matches!(again, Err(GraphError::PerspectiveExists(_))));
    }
}
