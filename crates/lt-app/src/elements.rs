//! App scaffolding elements
//!
//! A fixed tree of well-known perspectives every account carries:
//! Home → Dashboard → {private section, blog section}. Element ids derive
//! deterministically from the user id and the element path, so every
//! session finds the same tree without a directory lookup.
//! [`AppElements::check`] lazily creates whatever is missing and is safe to
//! run on every application start.

use crate::config::AppConfig;
use crate::error::AppError;
use lt_graph::{GraphClient, GraphError, Perspective, PerspectiveId};
use lt_patterns::{Dashboard, Home, Section};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// Slash-separated path of a scaffolding element
///
/// # Examples
/// - `/` → the user home
/// - `/linkedThoughts/blogSection` → the blog section
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementPath(Vec<String>);

impl ElementPath {
    /// Root path (the user home)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path segments from root to leaf
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether this is the root path
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Last segment, if not root
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(|s| s.as_str())
    }

    /// Append a segment, returning a new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }
}

impl Display for ElementPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "/")
        } else {
            write!(f, "/{}", self.0.join("/"))
        }
    }
}

impl FromStr for ElementPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(rest) = s.strip_prefix('/') else {
            return Err(PathError::MissingLeadingSlash(s.to_string()));
        };
        if rest.is_empty() {
            return Ok(Self::root());
        }

        let segments: Vec<String> = rest
            .split('/')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else if seg.contains(|c: char| !c.is_alphanumeric() && c != '_') {
                    Err(PathError::InvalidSegment(seg.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

/// Errors related to element paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Paths are absolute
    #[error("element path must start with '/': {0}")]
    MissingLeadingSlash(String),

    /// Empty segment in path
    #[error("element path contains empty segment")]
    EmptySegment,

    /// Invalid segment characters
    #[error("invalid path segment: {0} (must be alphanumeric or underscore)")]
    InvalidSegment(String),
}

/// The well-known scaffolding tree of one user
#[derive(Debug)]
pub struct AppElements {
    graph: Arc<GraphClient>,
    private_section_title: String,
    blog_section_title: String,
}

impl AppElements {
    /// The user home element
    pub const HOME: &'static str = "/";
    /// The root dashboard element
    pub const DASHBOARD: &'static str = "/linkedThoughts";
    /// The private section element
    pub const PRIVATE_SECTION: &'static str = "/linkedThoughts/privateSection";
    /// The blog section element
    pub const BLOG_SECTION: &'static str = "/linkedThoughts/blogSection";

    /// Scaffolding over the given client
    #[must_use]
    pub fn new(graph: Arc<GraphClient>, config: &AppConfig) -> Self {
        Self {
            graph,
            private_section_title: config.private_section_title.clone(),
            blog_section_title: config.blog_section_title.clone(),
        }
    }

    /// Deterministic id of a scaffolding element
    ///
    /// # Errors
    /// - `AppError::Path` if the path does not parse
    /// - `AppError::ElementNotFound` if the path is not part of the layout
    pub fn id_of(&self, path: &str) -> Result<PerspectiveId, AppError> {
        let parsed: ElementPath = path.parse()?;
        let canonical = parsed.to_string();
        let known = [
            Self::HOME,
            Self::DASHBOARD,
            Self::PRIVATE_SECTION,
            Self::BLOG_SECTION,
        ];
        if !known.contains(&canonical.as_str()) {
            return Err(AppError::ElementNotFound(canonical));
        }
        Ok(Self::derive_id(self.graph.user_id(), &canonical))
    }

    /// Resolve a scaffolding element to its perspective
    ///
    /// # Errors
    /// Path failures as [`AppElements::id_of`]; a missing perspective
    /// (scaffolding never checked) surfaces as a graph not-found error.
    pub async fn get(&self, path: &str) -> Result<Perspective, AppError> {
        let id = self.id_of(path)?;
        Ok(self.graph.get_perspective(id).await?)
    }

    /// Idempotently ensure the scaffolding tree exists
    ///
    /// Existing elements are left untouched; missing ones are created and
    /// committed with a single flush. Safe to call on every start.
    ///
    /// # Errors
    /// Propagates graph failures unrecovered
    pub async fn check(&self) -> Result<(), AppError> {
        let user = self.graph.user_id().to_string();
        let home_id = Self::derive_id(&user, Self::HOME);
        let dashboard_id = Self::derive_id(&user, Self::DASHBOARD);
        let private_id = Self::derive_id(&user, Self::PRIVATE_SECTION);
        let blog_id = Self::derive_id(&user, Self::BLOG_SECTION);

        // ids are deterministic, so parent objects may reference children
        // that are created later in the same pass
        let mut created = 0;
        created += self
            .ensure(
                home_id,
                to_object(&Home {
                    linked_thoughts: dashboard_id,
                })?,
                None,
            )
            .await?;
        created += self
            .ensure(
                dashboard_id,
                to_object(&Dashboard {
                    sections: vec![private_id, blog_id],
                })?,
                Some(home_id),
            )
            .await?;
        created += self
            .ensure(
                private_id,
                to_object(&Section::new(&self.private_section_title))?,
                Some(dashboard_id),
            )
            .await?;
        created += self
            .ensure(
                blog_id,
                to_object(&Section::new(&self.blog_section_title))?,
                Some(dashboard_id),
            )
            .await?;

        if created > 0 {
            self.graph.flush().await?;
            tracing::info!(created, "app scaffolding repaired");
        } else {
            tracing::debug!("app scaffolding intact");
        }
        Ok(())
    }

    async fn ensure(
        &self,
        id: PerspectiveId,
        object: Value,
        guardian: Option<PerspectiveId>,
    ) -> Result<usize, AppError> {
        match self.graph.get_perspective(id).await {
            Ok(_) => Ok(0),
            Err(GraphError::PerspectiveNotFound(_)) => {
                self.graph
                    .new_perspective_with_id(id, object, guardian)
                    .await?;
                Ok(1)
            }
            Err(other) => Err(other.into()),
        }
    }

    fn derive_id(user: &str, path: &str) -> PerspectiveId {
        PerspectiveId::derive(format!("app/{user}{path}").as_bytes())
    }
}

fn to_object<T: serde::Serialize>(shape: &T) -> Result<Value, AppError> {
    serde_json::to_value(shape)
        .map_err(GraphError::from)
        .map_err(AppError::from)
}
