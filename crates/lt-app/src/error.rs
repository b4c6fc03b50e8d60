//! Error types for the application layer
//!
//! No error translation happens here: graph failures propagate unmodified
//! and callers present them. Not-found conditions carry enough context to
//! name what was being loaded.

use crate::elements::PathError;
use lt_graph::{GraphError, PerspectiveId};

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A scaffolding element path is not part of the app layout
    #[error("app element not found: {0}")]
    ElementNotFound(String),

    /// A scaffolding element path failed to parse
    #[error("invalid element path: {0}")]
    Path(#[from] PathError),

    /// A section index beyond the dashboard's section list
    #[error("section index {index} out of range ({count} sections)")]
    SectionOutOfRange {
        /// Requested index
        index: usize,
        /// Number of sections on the dashboard
        count: usize,
    },

    /// A perspective expected to hold a section holds something else
    #[error("perspective {0} does not hold a section")]
    NotASection(PerspectiveId),

    /// A perspective expected to hold a dashboard holds something else
    #[error("perspective {0} does not hold a dashboard")]
    NotADashboard(PerspectiveId),

    /// Graph service failure, propagated unmodified
    #[error(transparent)]
    Graph(#[from] GraphError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_names_both_numbers() {
        let err = AppError::SectionOutOfRange { index: 5, count: 2 };
        let text = err.to_string();
        assert!(text.contains('5'));
        assert!(text.contains('2'));
    }

    #[test]
    fn graph_errors_pass_through_unmodified() {
        let id = PerspectiveId::derive(b"gone");
        let err = AppError::from(GraphError::PerspectiveNotFound(id));
        assert_eq!(
            err.to_string(),
            GraphError::PerspectiveNotFound(id).to_string()
        );
    }
}
