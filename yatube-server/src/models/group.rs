//! Group field validation
//!
//! Slug format: ASCII letters, digits, hyphens and underscores

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum length for group slugs
const MAX_SLUG_LEN: usize = 50;

/// Maximum length for group titles
const MAX_TITLE_LEN: usize = 200;

/// Matches DB constraint: ^[-a-zA-Z0-9_]+$
static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("invalid slug regex"));

/// Validated group slug, the unique address of a group page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupSlug(String);

impl GroupSlug {
    /// Create a new group slug.
    ///
    /// # Rules
    /// - Max 50 characters
    /// - ASCII letters, digits, hyphens, underscores
    ///
    /// # Example
    /// ```
    /// use yatube_server::models::GroupSlug;
    ///
    /// assert!(GroupSlug::new("cats-and_dogs").is_ok());
    /// assert!(GroupSlug::new("cats and dogs").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "slug" });
        }

        if s.len() > MAX_SLUG_LEN {
            return Err(ValidationError::TooLong {
                field: "slug",
                max: MAX_SLUG_LEN,
            });
        }

        if !SLUG_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "slug",
                reason: "must contain only letters, numbers, underscores or hyphens",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GroupSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated group title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTitle(String);

impl GroupTitle {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }

        if trimmed.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TooLong {
                field: "title",
                max: MAX_TITLE_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated group description (required, unbounded)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDescription(String);

impl GroupDescription {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "description",
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Everything needed to insert a group
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: GroupTitle,
    pub slug: GroupSlug,
    pub description: GroupDescription,
}

impl NewGroup {
    /// Validate all three fields at once.
    pub fn new(title: &str, slug: &str, description: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            title: GroupTitle::new(title)?,
            slug: GroupSlug::new(slug)?,
            description: GroupDescription::new(description)?,
        })
    }
}
