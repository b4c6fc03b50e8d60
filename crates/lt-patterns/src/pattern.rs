//! Pattern recognizers and link capabilities
//!
//! Each known object shape has a recognizer answering "does this opaque
//! object match my shape" by structural duck-typing on required fields.
//! Recognizers never fail: a malformed shape is simply not recognized.
//!
//! Link access is attachable behavior, not inheritance: shapes implement
//! [`HasChildren`] for their structural child links and, where they carry
//! `isA` relations, [`HasLinksTo`] for the set-like concept links.

use crate::schemas::{Dashboard, Home, NodeMeta, Section, TaggedTextNode, TextNode};
use lt_graph::PerspectiveId;
use serde_json::Value;

/// Ordered structural child links of an object shape
///
/// `replace_children` is pure: it returns a new object with the children
/// replaced positionally and never mutates the input.
pub trait HasChildren: Sized {
    /// The object's ordered child links
    fn children(&self) -> Vec<PerspectiveId>;

    /// New object with children replaced
    fn replace_children(&self, children: &[PerspectiveId]) -> Self;
}

/// Set-like `isA` concept relations of an object shape
///
/// Distinct from structural children: relations classify the object and
/// merge by union, they do not participate in tree navigation.
pub trait HasLinksTo: Sized {
    /// The object's concept relations
    fn links_to(&self) -> Vec<PerspectiveId>;

    /// New object with relations replaced
    fn replace_links_to(&self, links: &[PerspectiveId]) -> Self;
}

impl HasChildren for Home {
    fn children(&self) -> Vec<PerspectiveId> {
        vec![self.linked_thoughts]
    }

    /// A home has exactly one child; an empty replacement keeps the
    /// current link.
    fn replace_children(&self, children: &[PerspectiveId]) -> Self {
        Self {
            linked_thoughts: children.first().copied().unwrap_or(self.linked_thoughts),
        }
    }
}

impl HasChildren for Dashboard {
    fn children(&self) -> Vec<PerspectiveId> {
        self.sections.clone()
    }

    fn replace_children(&self, children: &[PerspectiveId]) -> Self {
        Self {
            sections: children.to_vec(),
        }
    }
}

impl HasChildren for Section {
    fn children(&self) -> Vec<PerspectiveId> {
        self.pages.clone()
    }

    fn replace_children(&self, children: &[PerspectiveId]) -> Self {
        Self {
            title: self.title.clone(),
            pages: children.to_vec(),
            meta: self.meta.clone(),
        }
    }
}

impl HasLinksTo for Section {
    fn links_to(&self) -> Vec<PerspectiveId> {
        self.meta.is_a.clone()
    }

    fn replace_links_to(&self, links: &[PerspectiveId]) -> Self {
        Self {
            title: self.title.clone(),
            pages: self.pages.clone(),
            meta: NodeMeta {
                is_a: links.to_vec(),
            },
        }
    }
}

impl HasChildren for TextNode {
    fn children(&self) -> Vec<PerspectiveId> {
        self.links.clone()
    }

    fn replace_children(&self, children: &[PerspectiveId]) -> Self {
        Self {
            text: self.text.clone(),
            text_type: self.text_type,
            links: children.to_vec(),
        }
    }
}

impl HasChildren for TaggedTextNode {
    fn children(&self) -> Vec<PerspectiveId> {
        self.node.children()
    }

    fn replace_children(&self, children: &[PerspectiveId]) -> Self {
        Self {
            node: self.node.replace_children(children),
            meta: self.meta.clone(),
        }
    }
}

impl HasLinksTo for TaggedTextNode {
    fn links_to(&self) -> Vec<PerspectiveId> {
        self.meta.is_a.clone()
    }

    fn replace_links_to(&self, links: &[PerspectiveId]) -> Self {
        Self {
            node: self.node.clone(),
            meta: NodeMeta {
                is_a: links.to_vec(),
            },
        }
    }
}

/// Shape recognizer over opaque objects
///
/// `recognize` must never fail; it answers false for any non-matching or
/// malformed shape. Recognizers are checked in a fixed priority order when
/// multiple could structurally match (subtype before base type).
pub trait Pattern: Send + Sync + std::fmt::Debug {
    /// Stable type identifier
    fn type_id(&self) -> &'static str;

    /// Whether the object matches this shape
    fn recognize(&self, object: &Value) -> bool;
}

/// Recognizer for [`Home`]: presence of `linkedThoughts`
#[derive(Debug, Clone, Copy, Default)]
pub struct HomePattern;

impl HomePattern {
    /// Stable type identifier
    pub const TYPE_ID: &'static str = "LinkedThoughts:UserHome";
}

impl Pattern for HomePattern {
    fn type_id(&self) -> &'static str {
        Self::TYPE_ID
    }

    fn recognize(&self, object: &Value) -> bool {
        object.get("linkedThoughts").is_some()
            && serde_json::from_value::<Home>(object.clone()).is_ok()
    }
}

/// Recognizer for [`Dashboard`]: presence of `sections`
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardPattern;

impl DashboardPattern {
    /// Stable type identifier
    pub const TYPE_ID: &'static str = "LinkedThoughts:Dashboard";
}

impl Pattern for DashboardPattern {
    fn type_id(&self) -> &'static str {
        Self::TYPE_ID
    }

    fn recognize(&self, object: &Value) -> bool {
        object.get("sections").is_some()
            && serde_json::from_value::<Dashboard>(object.clone()).is_ok()
    }
}

/// Recognizer for [`Section`]: presence of both `title` and `pages`
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionPattern;

impl SectionPattern {
    /// Stable type identifier
    pub const TYPE_ID: &'static str = "LinkedThoughts:Section";
}

impl Pattern for SectionPattern {
    fn type_id(&self) -> &'static str {
        Self::TYPE_ID
    }

    fn recognize(&self, object: &Value) -> bool {
        object.get("title").is_some()
            && object.get("pages").is_some()
            && serde_json::from_value::<Section>(object.clone()).is_ok()
    }
}

/// Recognizer for [`TextNode`]: presence of `text` and `type`
///
/// Also recognizes the tagged subtype, which carries all base fields; the
/// subtype recognizer must therefore be checked first.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNodePattern;

impl TextNodePattern {
    /// Stable type identifier
    pub const TYPE_ID: &'static str = "LinkedThoughts:TextNode";
}

impl Pattern for TextNodePattern {
    fn type_id(&self) -> &'static str {
        Self::TYPE_ID
    }

    fn recognize(&self, object: &Value) -> bool {
        object.get("text").is_some()
            && object.get("type").is_some()
            && serde_json::from_value::<TextNode>(object.clone()).is_ok()
    }
}

/// Recognizer for [`TaggedTextNode`]: base fields plus `meta.isA`
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggedTextNodePattern;

impl TaggedTextNodePattern {
    /// Stable type identifier
    pub const TYPE_ID: &'static str = "LinkedThoughts:TaggedTextNode";
}

impl Pattern for TaggedTextNodePattern {
    fn type_id(&self) -> &'static str {
        Self::TYPE_ID
    }

    fn recognize(&self, object: &Value) -> bool {
        TextNodePattern.recognize(object)
            && object
                .get("meta")
                .and_then(|meta| meta.get("isA"))
                .is_some()
            && serde_json::from_value::<TaggedTextNode>(object.clone()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::TextType;
    use serde_json::json;

    fn id(payload: &[u8]) -> PerspectiveId {
        PerspectiveId::derive(payload)
    }

    #[test]
    fn structural_recognizers_are_mutually_exclusive() {
        let section = json!({ "title": "Private", "pages": [] });
        assert!(SectionPattern.recognize(&section));
        assert!(!DashboardPattern.recognize(&section));
        assert!(!HomePattern.recognize(&section));

        let dashboard = json!({ "sections": [] });
        assert!(DashboardPattern.recognize(&dashboard));
        assert!(!SectionPattern.recognize(&dashboard));
        assert!(!HomePattern.recognize(&dashboard));

        let home = json!({ "linkedThoughts": id(b"dash").to_string() });
        assert!(HomePattern.recognize(&home));
        assert!(!DashboardPattern.recognize(&home));
        assert!(!SectionPattern.recognize(&home));
    }

    #[test]
    fn recognize_rejects_malformed_shapes() {
        // required field present but not decodable
        assert!(!DashboardPattern.recognize(&json!({ "sections": 42 })));
        assert!(!SectionPattern.recognize(&json!({ "title": 1, "pages": [] })));
        assert!(!HomePattern.recognize(&json!({ "linkedThoughts": "not-hex" })));
        // and never panics on non-objects
        assert!(!SectionPattern.recognize(&json!(null)));
        assert!(!TextNodePattern.recognize(&json!([1, 2, 3])));
    }

    #[test]
    fn tagged_recognizer_is_strictly_more_specific() {
        let plain = json!({ "text": "", "type": "Title", "links": [] });
        let tagged = json!({
            "text": "", "type": "Title", "links": [],
            "meta": { "isA": [id(b"concept/blogpost").to_string()] }
        });

        assert!(TextNodePattern.recognize(&plain));
        assert!(!TaggedTextNodePattern.recognize(&plain));

        // the base recognizer accepts the subtype, so priority ordering
        // matters
        assert!(TextNodePattern.recognize(&tagged));
        assert!(TaggedTextNodePattern.recognize(&tagged));
    }

    #[test]
    fn replace_children_is_pure() {
        let dashboard = Dashboard {
            sections: vec![id(b"a")],
        };
        let replacement = [id(b"b"), id(b"c")];

        let once = dashboard.replace_children(&replacement);
        let twice = dashboard.replace_children(&replacement);

        assert_eq!(once, twice);
        assert_eq!(dashboard.sections, vec![id(b"a")]);
    }

    #[test]
    fn children_round_trip() {
        let section = Section::new("Private");
        let ids = [id(b"x"), id(b"y"), id(b"z")];
        assert_eq!(section.replace_children(&ids).children(), ids.to_vec());

        let node = TextNode::empty_title();
        assert_eq!(node.replace_children(&ids).children(), ids.to_vec());
    }

    #[test]
    fn home_replace_children_keeps_link_on_empty() {
        let home = Home {
            linked_thoughts: id(b"dash"),
        };
        assert_eq!(home.replace_children(&[]).linked_thoughts, id(b"dash"));
        assert_eq!(
            home.replace_children(&[id(b"other")]).linked_thoughts,
            id(b"other")
        );
    }

    #[test]
    fn links_to_is_distinct_from_children() {
        let concept = id(b"concept/blogpost");
        let page = id(b"page");
        let tagged = TaggedTextNode {
            node: TextNode {
                text: "post".to_string(),
                text_type: TextType::Title,
                links: vec![page],
            },
            meta: NodeMeta {
                is_a: vec![concept],
            },
        };

        assert_eq!(tagged.children(), vec![page]);
        assert_eq!(tagged.links_to(), vec![concept]);

        let retagged = tagged.replace_links_to(&[concept, id(b"concept/other")]);
        assert_eq!(retagged.children(), vec![page]);
        assert_eq!(retagged.links_to().len(), 2);
    }
}
