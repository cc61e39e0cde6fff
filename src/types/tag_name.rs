// ABOUTME: Validated image tag name.
// ABOUTME: Follows OCI distribution tag rules: [A-Za-z0-9_][A-Za-z0-9._-]{0,127}.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TagNameError {
    #[error("tag name cannot be empty")]
    Empty,

    #[error("tag name exceeds maximum length of 128 characters")]
    TooLong,

    #[error("tag name cannot start with '{0}'")]
    InvalidStart(char),

    #[error("invalid character in tag name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagName(String);

impl TagName {
    pub fn new(value: &str) -> Result<Self, TagNameError> {
        let mut chars = value.chars();
        let first = chars.next().ok_or(TagNameError::Empty)?;

        if value.len() > 128 {
            return Err(TagNameError::TooLong);
        }

        if first == '.' || first == '-' {
            return Err(TagNameError::InvalidStart(first));
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '_' && c != '.' && c != '-' {
                return Err(TagNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
