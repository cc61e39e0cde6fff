// ABOUTME: Validated repository name within a registry.
// ABOUTME: Enforces lowercase path components separated by slashes.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryNameError {
    #[error("repository name cannot be empty")]
    Empty,

    #[error("repository name exceeds maximum length of 256 characters")]
    TooLong,

    #[error("repository name contains an empty path component")]
    EmptyComponent,

    #[error("repository name must be lowercase")]
    NotLowercase,

    #[error("invalid character in repository name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub fn new(value: &str) -> Result<Self, RepositoryNameError> {
        if value.is_empty() {
            return Err(RepositoryNameError::Empty);
        }

        if value.len() > 256 {
            return Err(RepositoryNameError::TooLong);
        }

        // Catches leading, trailing, and doubled slashes in one pass
        if value.split('/').any(str::is_empty) {
            return Err(RepositoryNameError::EmptyComponent);
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(RepositoryNameError::NotLowercase);
            }
            if !c.is_ascii_lowercase()
                && !c.is_ascii_digit()
                && c != '/'
                && c != '.'
                && c != '_'
                && c != '-'
            {
                return Err(RepositoryNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
