//! Access control
//!
//! Each perspective carries an ACL entry; with delegation enabled the
//! effective policy resolves through the guardian chain. Policy writes are
//! applied in place (not staged) and are idempotent.

use crate::client::{ClientState, GraphClient};
use crate::error::GraphError;
use crate::id::PerspectiveId;
use crate::perspective::{AclEntry, PermissionKind};

/// Delegation chains longer than this are treated as unresolvable
const MAX_DELEGATION_DEPTH: usize = 32;

/// Resolve the effective ACL entry through the delegation chain
pub(crate) fn resolve_acl(state: &ClientState, id: PerspectiveId) -> Option<AclEntry> {
    let mut current = id;
    for _ in 0..MAX_DELEGATION_DEPTH {
        let record = state.get(&current)?;
        if !record.acl.delegate {
            return Some(record.acl.clone());
        }
        match record.acl.guardian {
            Some(guardian) => current = guardian,
            // delegating without a guardian: the own entry governs
            None => return Some(record.acl.clone()),
        }
    }
    None
}

impl GraphClient {
    /// Enable or disable policy delegation on a perspective
    ///
    /// With delegation off the perspective's own ACL governs regardless of
    /// its guardian. Setting the current value again has no observable
    /// effect.
    ///
    /// # Errors
    /// `GraphError::PerspectiveNotFound` if the id does not resolve
    pub async fn toggle_delegate(
        &self,
        id: PerspectiveId,
        enabled: bool,
    ) -> Result<(), GraphError> {
        self.with_acl(id, |acl| acl.delegate = enabled).await
    }

    /// Grant or revoke a public permission on a perspective
    ///
    /// Idempotent: re-applying the current grant has no observable effect.
    ///
    /// # Errors
    /// `GraphError::PerspectiveNotFound` if the id does not resolve
    pub async fn set_public_permissions(
        &self,
        id: PerspectiveId,
        kind: PermissionKind,
        allow: bool,
    ) -> Result<(), GraphError> {
        self.with_acl(id, |acl| match kind {
            PermissionKind::Read => acl.public_read = allow,
            PermissionKind::Write => acl.public_write = allow,
        })
        .await
    }

    /// Effective ACL of a perspective after delegation resolution
    ///
    /// An unresolvable chain resolves to the default (deny-all) entry.
    ///
    /// # Errors
    /// `GraphError::PerspectiveNotFound` if the id does not resolve
    pub async fn effective_permissions(
        &self,
        id: PerspectiveId,
    ) -> Result<AclEntry, GraphError> {
        let state = self.state.read().await;
        if state.get(&id).is_none() {
            return Err(GraphError::PerspectiveNotFound(id));
        }
        Ok(resolve_acl(&state, id).unwrap_or_default())
    }

    /// Apply a policy edit to the record in place (staged copy if one
    /// exists, committed record otherwise)
    async fn with_acl(
        &self,
        id: PerspectiveId,
        edit: impl FnOnce(&mut AclEntry),
    ) -> Result<(), GraphError> {
        let mut state = self.state.write().await;
        if let Some(entry) = state.staged.get_mut(&id) {
            edit(&mut entry.record.acl);
            return Ok(());
        }
        if let Some(record) = state.committed.get_mut(&id) {
            edit(&mut record.acl);
            return Ok(());
        }
        Err(GraphError::PerspectiveNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{node, test_client};

    #[tokio::test]
    async fn public_permissions_are_idempotent() {
        let client = test_client("alice");
        let id = client.new_perspective(node(&[])).await.unwrap();
        client.flush().await.unwrap();

        client
            .set_public_permissions(id, PermissionKind::Read, true)
            .await
            .unwrap();
        let first = client.effective_permissions(id).await.unwrap();

        client
            .set_public_permissions(id, PermissionKind::Read, true)
            .await
            .unwrap();
        let second = client.effective_permissions(id).await.unwrap();

        assert_eq!(first, second);
        assert!(second.public_read);
    }

    #[tokio::test]
    async fn delegation_resolves_through_guardian() {
        let client = test_client("alice");
        let parent = client.new_perspective(node(&[])).await.unwrap();
        let child = client.add_new_child(node(&[]), parent).await.unwrap();
        client.flush().await.unwrap();

        client
            .set_public_permissions(parent, PermissionKind::Read, true)
            .await
            .unwrap();

        // the child delegates to its parent
        let effective = client.effective_permissions(child).await.unwrap();
        assert!(effective.public_read);

        // delegation off: own (deny-all) entry governs again
        client.toggle_delegate(child, false).await.unwrap();
        let own = client.effective_permissions(child).await.unwrap();
        assert!(!own.public_read);
    }

    #[tokio::test]
    async fn acl_edit_on_missing_perspective_fails() {
        let client = test_client("alice");
        let ghost = crate::id::PerspectiveId::derive(b"ghost");
        let result = client.toggle_delegate(ghost, false).await;
        assert!(matches!(result, Err(GraphError::PerspectiveNotFound(_))));
    }
}
