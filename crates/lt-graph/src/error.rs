//! Error types for the graph service
//!
//! Remote-call failures surface to callers unrecovered; this layer adds no
//! retry or fallback.

use crate::id::{IdError, PerspectiveId};

/// Main graph service error type
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A referenced perspective does not resolve
    #[error("perspective not found: {0}")]
    PerspectiveNotFound(PerspectiveId),

    /// A perspective id is already taken
    #[error("perspective already exists: {0}")]
    PerspectiveExists(PerspectiveId),

    /// The session may not mutate the perspective
    #[error("permission denied: cannot update {0}")]
    PermissionDenied(PerspectiveId),

    /// Identifier error
    #[error("identifier error: {0}")]
    Id(#[from] IdError),

    /// Payload serialization failed
    #[error("object serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_perspective() {
        let id = PerspectiveId::derive(b"missing");
        let err = GraphError::PerspectiveNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }
}
