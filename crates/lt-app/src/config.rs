//! Application configuration
//!
//! Session identity and the titles of the scaffolding sections. Concept
//! names are well-known, not configurable.

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Session user id; scaffolding ids derive from it
    pub user_id: String,
    /// Title of the private section
    pub private_section_title: String,
    /// Title of the blog section
    pub blog_section_title: String,
}

impl AppConfig {
    /// Configuration for a user with the default section titles
    #[inline]
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            private_section_title: "Private".to_string(),
            blog_section_title: "Blog".to_string(),
        }
    }

    /// With a private section title
    #[inline]
    #[must_use]
    pub fn with_private_section_title(mut self, title: impl Into<String>) -> Self {
        self.private_section_title = title.into();
        self
    }

    /// With a blog section title
    #[inline]
    #[must_use]
    pub fn with_blog_section_title(mut self, title: impl Into<String>) -> Self {
        self.blog_section_title = title.into();
        self
    }
}

/// Well-known concept identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConceptId {
    /// Tags a text node as a published blog post
    BlogPost,
    /// Tags a section as a user's blog home
    BlogHome,
}

impl ConceptId {
    /// Stable concept name used for perspective derivation
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConceptId::BlogPost => "blogpost",
            ConceptId::BlogHome => "bloghome",
        }
    }
}

impl std::fmt::Display for ConceptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = AppConfig::new("alice").with_blog_section_title("Published");
        assert_eq!(config.user_id, "alice");
        assert_eq!(config.private_section_title, "Private");
        assert_eq!(config.blog_section_title, "Published");
    }

    #[test]
    fn concept_names_are_stable() {
        assert_eq!(ConceptId::BlogPost.as_str(), "blogpost");
        assert_eq!(ConceptId::BlogHome.to_string(), "bloghome");
    }
}
