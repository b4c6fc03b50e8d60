//! Pattern registry and typed dispatch
//!
//! [`PatternRegistry`] holds the recognizers in fixed priority order
//! (most-specific first) and implements the graph crate's
//! [`LinkInterpreter`] seam so the service can read and rewrite links on
//! opaque objects. [`Recognized`] is the typed result of dispatch, with an
//! explicit fallback variant for unknown shapes.

use crate::pattern::{
    DashboardPattern, HasChildren, HasLinksTo, HomePattern, Pattern, SectionPattern,
    TaggedTextNodePattern, TextNodePattern,
};
use crate::schemas::{Dashboard, Home, Section, TaggedTextNode, TextNode};
use lt_graph::{LinkInterpreter, PerspectiveId};
use serde_json::{json, Value};

/// Typed view of an opaque object after recognition
#[derive(Debug, Clone, PartialEq)]
pub enum Recognized {
    /// Text node with `isA` relations (checked before the base type)
    TaggedText(TaggedTextNode),
    /// Plain text node
    Text(TextNode),
    /// Titled page container
    Section(Section),
    /// Section container
    Dashboard(Dashboard),
    /// User home
    Home(Home),
    /// No known shape matched
    Unrecognized(Value),
}

impl Recognized {
    /// Dispatch an object through the recognizers, most-specific first
    ///
    /// Never fails: objects matching no shape (or matching a shape's
    /// required fields with undecodable content) land in
    /// [`Recognized::Unrecognized`].
    #[must_use]
    pub fn decode(object: &Value) -> Self {
        if TaggedTextNodePattern.recognize(object) {
            if let Ok(node) = serde_json::from_value(object.clone()) {
                return Self::TaggedText(node);
            }
        }
        if TextNodePattern.recognize(object) {
            if let Ok(node) = serde_json::from_value(object.clone()) {
                return Self::Text(node);
            }
        }
        if SectionPattern.recognize(object) {
            if let Ok(section) = serde_json::from_value(object.clone()) {
                return Self::Section(section);
            }
        }
        if DashboardPattern.recognize(object) {
            if let Ok(dashboard) = serde_json::from_value(object.clone()) {
                return Self::Dashboard(dashboard);
            }
        }
        if HomePattern.recognize(object) {
            if let Ok(home) = serde_json::from_value(object.clone()) {
                return Self::Home(home);
            }
        }
        Self::Unrecognized(object.clone())
    }

    /// Type identifier of the recognized shape
    #[must_use]
    pub fn type_id(&self) -> Option<&'static str> {
        match self {
            Self::TaggedText(_) => Some(TaggedTextNodePattern::TYPE_ID),
            Self::Text(_) => Some(TextNodePattern::TYPE_ID),
            Self::Section(_) => Some(SectionPattern::TYPE_ID),
            Self::Dashboard(_) => Some(DashboardPattern::TYPE_ID),
            Self::Home(_) => Some(HomePattern::TYPE_ID),
            Self::Unrecognized(_) => None,
        }
    }

    /// Ordered structural children of the recognized shape
    #[must_use]
    pub fn children(&self) -> Vec<PerspectiveId> {
        match self {
            Self::TaggedText(node) => node.children(),
            Self::Text(node) => node.children(),
            Self::Section(section) => section.children(),
            Self::Dashboard(dashboard) => dashboard.children(),
            Self::Home(home) => home.children(),
            Self::Unrecognized(_) => Vec::new(),
        }
    }

    /// Set-like `isA` relations of the recognized shape
    #[must_use]
    pub fn links_to(&self) -> Vec<PerspectiveId> {
        match self {
            Self::TaggedText(node) => node.links_to(),
            Self::Section(section) => section.links_to(),
            _ => Vec::new(),
        }
    }
}

/// Registry of recognizers in fixed priority order
#[derive(Debug)]
pub struct PatternRegistry {
    patterns: Vec<Box<dyn Pattern>>,
}

impl PatternRegistry {
    /// Registry with the standard shapes, subtype before base
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            patterns: vec![
                Box::new(TaggedTextNodePattern),
                Box::new(TextNodePattern),
                Box::new(SectionPattern),
                Box::new(DashboardPattern),
                Box::new(HomePattern),
            ],
        }
    }

    /// Type identifier of the first recognizing pattern
    #[must_use]
    pub fn type_of(&self, object: &Value) -> Option<&'static str> {
        self.patterns
            .iter()
            .find(|pattern| pattern.recognize(object))
            .map(|pattern| pattern.type_id())
    }

    /// Typed dispatch of an opaque object
    #[must_use]
    pub fn recognize(&self, object: &Value) -> Recognized {
        Recognized::decode(object)
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Pure field rewrite on a JSON object; non-objects come back unchanged
fn set_field(object: &Value, key: &str, value: Value) -> Value {
    let mut out = object.clone();
    if let Value::Object(map) = &mut out {
        map.insert(key.to_string(), value);
    }
    out
}

/// Pure rewrite of `meta.isA`, creating `meta` when absent
fn set_is_a(object: &Value, links: &[PerspectiveId]) -> Value {
    let mut out = object.clone();
    if let Value::Object(map) = &mut out {
        let meta = map
            .entry("meta".to_string())
            .or_insert_with(|| json!({}));
        if let Value::Object(meta_map) = meta {
            meta_map.insert("isA".to_string(), json!(links));
        }
    }
    out
}

impl LinkInterpreter for PatternRegistry {
    fn children(&self, object: &Value) -> Vec<PerspectiveId> {
        Recognized::decode(object).children()
    }

    /// Rewrites only the shape's child-link field, so unknown extra fields
    /// on the stored object survive the edit.
    fn replace_children(&self, object: &Value, children: &[PerspectiveId]) -> Value {
        match Recognized::decode(object) {
            Recognized::Home(home) => match children.first() {
                Some(first) => set_field(object, "linkedThoughts", json!(first)),
                None => set_field(object, "linkedThoughts", json!(home.linked_thoughts)),
            },
            Recognized::Dashboard(_) => set_field(object, "sections", json!(children)),
            Recognized::Section(_) => set_field(object, "pages", json!(children)),
            Recognized::Text(_) | Recognized::TaggedText(_) => {
                set_field(object, "links", json!(children))
            }
            Recognized::Unrecognized(_) => object.clone(),
        }
    }

    fn links_to(&self, object: &Value) -> Vec<PerspectiveId> {
        Recognized::decode(object).links_to()
    }

    /// Tagging a plain text node creates its `meta`, turning it into the
    /// tagged subtype; sections tag in place. Other shapes come back
    /// unchanged.
    fn replace_links_to(&self, object: &Value, links: &[PerspectiveId]) -> Value {
        match Recognized::decode(object) {
            Recognized::Text(_) | Recognized::TaggedText(_) | Recognized::Section(_) => {
                set_is_a(object, links)
            }
            _ => object.clone(),
        }
    }
}
