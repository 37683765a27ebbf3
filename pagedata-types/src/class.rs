//! Class identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a class definition within a wiki.
///
/// Two `ClassRef`s with the same wiki and page name are interchangeable as
/// grouping and filtering keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassRef {
    wiki: String,
    page: String,
}

impl ClassRef {
    pub fn new(wiki: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            wiki: wiki.into(),
            page: page.into(),
        }
    }

    /// A class in the main wiki.
    pub fn local(page: impl Into<String>) -> Self {
        Self::new("main", page)
    }

    pub fn wiki(&self) -> &str {
        &self.wiki
    }

    pub fn page(&self) -> &str {
        &self.page
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.wiki, self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_by_value() {
        assert_eq!(ClassRef::local("Blog.Post"), ClassRef::new("main", "Blog.Post"));
        assert_ne!(ClassRef::local("Blog.Post"), ClassRef::new("docs", "Blog.Post"));
    }

    #[test]
    fn test_display() {
        assert_eq!(ClassRef::local("Blog.Post").to_string(), "main:Blog.Post");
    }
}
