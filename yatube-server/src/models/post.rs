//! Post text and the post form

use serde::Deserialize;

use super::{FormErrors, ValidationError};

/// Number of characters shown in the short string form of posts and groups
pub const SHOW_CHARS: usize = 15;

/// First [`SHOW_CHARS`] characters of `s`.
pub fn truncate_display(s: &str) -> &str {
    match s.char_indices().nth(SHOW_CHARS) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Validated post body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostText(String);

impl PostText {
    /// Create post text. Surrounding whitespace is stripped; the rest must be non-empty.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "text" });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Raw post form as submitted by the browser
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    /// Group id, or empty for "no group"
    #[serde(default)]
    pub group: Option<String>,
}

/// Validated post fields, ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInput {
    pub text: PostText,
    pub group_id: Option<i64>,
}

impl PostForm {
    /// Validate the form against the ids of existing groups.
    ///
    /// All field errors are collected, not just the first.
    pub fn validate(&self, known_groups: &[i64]) -> Result<PostInput, FormErrors> {
        let mut errors = FormErrors::new();

        let text = PostText::new(&self.text).map_err(|e| errors.push(e)).ok();

        let group_id = match self.group.as_deref().map(str::trim) {
            None | Some("") => Some(None),
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) if known_groups.contains(&id) => Some(Some(id)),
                _ => {
                    errors.push(ValidationError::InvalidChoice {
                        field: "group",
                        value: raw.to_owned(),
                    });
                    None
                }
            },
        };

        match (text, group_id) {
            (Some(text), Some(group_id)) => Ok(PostInput { text, group_id }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(text: &str, group: Option<&str>) -> PostForm {
        PostForm {
            text: text.to_owned(),
            group: group.map(str::to_owned),
        }
    }

    #[test]
    fn truncates_to_show_chars() {
        assert_eq!(truncate_display("short"), "short");
        assert_eq!(truncate_display("Тестовый пост, измененный"), "Тестовый пост, ");
        assert_eq!(truncate_display(&"x".repeat(15)), "x".repeat(15));
    }

    #[test]
    fn valid_without_group() {
        let input = form("Тестовый пост", None).validate(&[]).unwrap();
        assert_eq!(input.text.as_str(), "Тестовый пост");
        assert_eq!(input.group_id, None);

        let input = form("text", Some("")).validate(&[1]).unwrap();
        assert_eq!(input.group_id, None);
    }

    #[test]
    fn valid_with_known_group() {
        let input = form("text", Some("3")).validate(&[1, 3]).unwrap();
        assert_eq!(input.group_id, Some(3));
    }

    #[test]
    fn rejects_blank_text() {
        let errors = form("   \n", None).validate(&[]).unwrap_err();
        assert_eq!(errors.for_field("text").count(), 1);
    }

    #[test]
    fn rejects_unknown_group() {
        let errors = form("text", Some("7")).validate(&[1]).unwrap_err();
        assert!(matches!(
            errors.for_field("group").next(),
            Some(ValidationError::InvalidChoice { .. })
        ));

        let errors = form("text", Some("abc")).validate(&[1]).unwrap_err();
        assert_eq!(errors.for_field("group").count(), 1);
    }

    #[test]
    fn collects_every_field_error() {
        let errors = form("", Some("nope")).validate(&[]).unwrap_err();
        assert_eq!(errors.iter().count(), 2);
    }
}
