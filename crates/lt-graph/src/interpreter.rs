//! Object interpretation seam
//!
//! The service stores opaque payloads; a [`LinkInterpreter`] tells it how to
//! read and rewrite the links carried by those payloads. Pattern registries
//! implement this trait for their known object shapes.

use crate::id::PerspectiveId;
use serde_json::Value;

/// How the service reads and writes links on opaque objects
///
/// # Contract
/// All methods are total: an unrecognized or malformed payload yields empty
/// link sets and is returned unchanged by the `replace_*` methods. Replace
/// operations are pure; the input payload is never mutated.
pub trait LinkInterpreter: Send + Sync + std::fmt::Debug {
    /// Ordered structural children of the object
    fn children(&self, object: &Value) -> Vec<PerspectiveId>;

    /// New payload with structural children replaced positionally
    fn replace_children(&self, object: &Value, children: &[PerspectiveId]) -> Value;

    /// Set-like semantic relations (`isA` concept tags) of the object
    fn links_to(&self, object: &Value) -> Vec<PerspectiveId>;

    /// New payload with semantic relations replaced
    fn replace_links_to(&self, object: &Value, links: &[PerspectiveId]) -> Value;
}
