//! Username and password validation

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum length for usernames
const MAX_USERNAME_LEN: usize = 150;

/// Minimum length for new passwords
const MIN_PASSWORD_LEN: usize = 8;

/// Letters, digits and @/./+/-/_ only
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("invalid username regex"));

/// Validated username
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Create a new username.
    ///
    /// # Example
    /// ```
    /// use yatube_server::models::Username;
    ///
    /// assert!(Username::new("author_post").is_ok());
    /// assert!(Username::new("no spaces").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "username" });
        }

        if s.chars().count() > MAX_USERNAME_LEN {
            return Err(ValidationError::TooLong {
                field: "username",
                max: MAX_USERNAME_LEN,
            });
        }

        if !USERNAME_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "username",
                reason: "may contain only letters, numbers, and @/./+/-/_ characters",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Plain-text password accepted for a new account.
///
/// Never stored; hashed by [`crate::auth::password::hash_password`].
#[derive(Clone, PartialEq, Eq)]
pub struct NewPassword(String);

impl NewPassword {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "password" });
        }
        if s.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::TooShort {
                field: "password",
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NewPassword(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_usernames() {
        assert!(Username::new("NoName").is_ok());
        assert!(Username::new("author.post+1@site").is_ok());
        assert!(Username::new("автор").is_ok());
    }

    #[test]
    fn rejects_bad_usernames() {
        assert!(matches!(
            Username::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
        assert!(matches!(
            Username::new("a/b").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            Username::new(&"u".repeat(151)).unwrap_err(),
            ValidationError::TooLong { max: 150, .. }
        ));
    }

    #[test]
    fn short_password_rejected() {
        assert!(matches!(
            NewPassword::new("short").unwrap_err(),
            ValidationError::TooShort { min: 8, .. }
        ));
        assert!(NewPassword::new("long enough").is_ok());
    }

    #[test]
    fn password_debug_is_redacted() {
        let pw = NewPassword::new("secret-password").unwrap();
        assert_eq!(format!("{:?}", pw), "NewPassword(***)");
    }
}
