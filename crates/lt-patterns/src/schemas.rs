//! Domain object shapes
//!
//! Plain data shapes stored as perspective payloads:
//! - [`Home`]: single link to the user's root dashboard
//! - [`Dashboard`]: ordered section links
//! - [`Section`]: titled, ordered page links, optionally concept-tagged
//! - [`TextNode`] and [`TaggedTextNode`]: typed text with ordered links,
//!   the tagged subtype carrying `isA` concept relations
//!
//! Serialized field names match the wire shapes of the stored objects
//! (`linkedThoughts`, `isA`, `type`).

use lt_graph::PerspectiveId;
use serde::{Deserialize, Serialize};

/// User home object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Home {
    /// The user's root dashboard
    #[serde(rename = "linkedThoughts")]
    pub linked_thoughts: PerspectiveId,
}

/// Root dashboard: ordered sequence of section links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Section perspective ids, in display order
    pub sections: Vec<PerspectiveId>,
}

/// Set of `isA` concept relations
///
/// Set-like: relations merge by union, unlike structural children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMeta {
    /// Concept perspective ids this object is tagged with
    #[serde(rename = "isA", default)]
    pub is_a: Vec<PerspectiveId>,
}

impl NodeMeta {
    /// Whether no relations are present
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_a.is_empty()
    }
}

/// A titled container of pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section title
    pub title: String,
    /// Page perspective ids, in insertion order
    pub pages: Vec<PerspectiveId>,
    /// Concept tags; absent in serialized form when empty, so untagged
    /// sections keep their original wire shape
    #[serde(default, skip_serializing_if = "NodeMeta::is_empty")]
    pub meta: NodeMeta,
}

impl Section {
    /// Empty section with the given title
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: Vec::new(),
            meta: NodeMeta::default(),
        }
    }
}

/// Text node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextType {
    /// Heading text
    Title,
    /// Body text
    Paragraph,
}

/// Typed text with ordered child links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextNode {
    /// Text content
    pub text: String,
    /// Kind of text
    #[serde(rename = "type")]
    pub text_type: TextType,
    /// Child perspective ids, in document order
    #[serde(default)]
    pub links: Vec<PerspectiveId>,
}

impl TextNode {
    /// The default empty page: a title with no text and no links
    #[inline]
    #[must_use]
    pub fn empty_title() -> Self {
        Self {
            text: String::new(),
            text_type: TextType::Title,
            links: Vec::new(),
        }
    }
}

/// Text node carrying `isA` concept relations
///
/// Strictly more specific than [`TextNode`]: all base fields plus `meta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedTextNode {
    /// The underlying text node
    #[serde(flatten)]
    pub node: TextNode,
    /// Concept relations
    pub meta: NodeMeta,
}
