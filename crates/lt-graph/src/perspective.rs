//! Perspective records and related data shapes
//!
//! A perspective is an addressable pointer to the mutable history of one
//! document. The service owns the records; consumers only see ids, details
//! and object payloads.

use crate::id::{ContentHash, IdError, PerspectiveId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier shared by all forks of one document
///
/// Forking a perspective preserves its lineage, which is what makes
/// reverse fork lookup possible without storing explicit provenance links
/// on the objects themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineageId(String);

impl LineageId {
    /// Create lineage from a stable payload (well-known documents)
    #[inline]
    #[must_use]
    pub fn derive(payload: &str) -> Self {
        Self(payload.to_string())
    }

    /// Generate fresh lineage for a brand new document
    #[inline]
    #[must_use]
    pub fn unique() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// The underlying lineage string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LineageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session-visible details of a perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerspectiveDetails {
    /// Whether the current session can mutate the perspective
    pub can_update: bool,
}

/// A perspective as seen by consumers: id plus details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perspective {
    /// Opaque address
    pub id: PerspectiveId,
    /// Session-visible details
    pub details: PerspectiveDetails,
}

/// Kind of public permission that can be granted on a perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionKind {
    /// Read access
    Read,
    /// Write access
    Write,
}

/// Access-control entry attached to a perspective
///
/// With `delegate` set, the effective policy is resolved through the
/// guardian chain instead of this entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    /// Whether policy is inherited from the guardian
    pub delegate: bool,
    /// Perspective whose policy governs when delegating
    pub guardian: Option<PerspectiveId>,
    /// Public read grant
    pub public_read: bool,
    /// Public write grant
    pub public_write: bool,
}

impl AclEntry {
    /// Entry delegating to the given guardian
    #[inline]
    #[must_use]
    pub fn delegating(guardian: Option<PerspectiveId>) -> Self {
        Self {
            delegate: true,
            guardian,
            public_read: false,
            public_write: false,
        }
    }
}

impl Default for AclEntry {
    fn default() -> Self {
        Self {
            delegate: false,
            guardian: None,
            public_read: false,
            public_write: false,
        }
    }
}

/// Service-side record backing one perspective
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveRecord {
    /// Current object payload (opaque to the service, interpreted through
    /// the registered patterns)
    pub object: serde_json::Value,
    /// Head hash of the current payload
    pub head: ContentHash,
    /// Lineage shared with every fork of this document
    pub lineage: LineageId,
    /// Owning user id (empty for service-owned perspectives)
    pub owner: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Access-control entry
    pub acl: AclEntry,
}

impl PerspectiveRecord {
    /// Create a record, computing the head hash of the payload
    ///
    /// # Errors
    /// Returns error if the payload cannot be hashed
    pub fn new(
        object: serde_json::Value,
        lineage: LineageId,
        owner: impl Into<String>,
    ) -> Result<Self, IdError> {
        let head = ContentHash::of_object(&object)?;
        Ok(Self {
            object,
            head,
            lineage,
            owner: owner.into(),
            created_at: Utc::now(),
            acl: AclEntry::default(),
        })
    }

    /// Record with an explicit ACL entry
    #[inline]
    #[must_use]
    pub fn with_acl(mut self, acl: AclEntry) -> Self {
        self.acl = acl;
        self
    }

    /// Replace the payload, recomputing the head
    ///
    /// # Errors
    /// Returns error if the payload cannot be hashed
    pub fn replace_object(&mut self, object: serde_json::Value) -> Result<(), IdError> {
        self.head = ContentHash::of_object(&object)?;
        self.object = object;
        Ok(())
    }
}

/// A (parent, child) location in the perspective tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentAndChild {
    /// Parent perspective holding the child link
    pub parent_id: PerspectiveId,
    /// Linked child perspective
    pub child_id: PerspectiveId,
}

/// A staged head change relative to committed state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadUpdate {
    /// Perspective whose head would change
    pub perspective_id: PerspectiveId,
    /// Committed head, if the perspective already exists
    pub old_head: Option<ContentHash>,
    /// Staged head
    pub new_head: ContentHash,
}

/// Staged mutations relative to committed state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    /// Perspectives that would be created
    pub new_perspectives: Vec<PerspectiveId>,
    /// Head updates to existing perspectives
    pub updates: Vec<HeadUpdate>,
}

impl DiffReport {
    /// Whether any existing perspective would be updated
    #[inline]
    #[must_use]
    pub fn has_updates(&self) -> bool {
        !self.updates.is_empty()
    }

    /// Whether the diff is entirely empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new_perspectives.is_empty() && self.updates.is_empty()
    }
}
