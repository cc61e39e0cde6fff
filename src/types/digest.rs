// ABOUTME: Content-addressed manifest digest (algorithm:encoded).
// ABOUTME: Borrows as str so digest sets can be probed with raw listing data.

use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("digest cannot be empty")]
    Empty,

    #[error("digest is missing the algorithm separator ':'")]
    MissingSeparator,

    #[error("digest algorithm is empty or invalid: {0}")]
    InvalidAlgorithm(String),

    #[error("digest encoded part is empty")]
    EmptyEncoded,

    #[error("invalid character in digest: '{0}'")]
    InvalidChar(char),
}

/// A manifest digest such as `sha256:9f86d081...`.
///
/// Equality and hashing are those of the underlying string, so a
/// `HashSet<Digest>` can be queried with a `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest(String);

impl Digest {
    pub fn parse(value: &str) -> Result<Self, DigestError> {
        if value.is_empty() {
            return Err(DigestError::Empty);
        }

        let (algorithm, encoded) = value
            .split_once(':')
            .ok_or(DigestError::MissingSeparator)?;

        let algorithm_ok = !algorithm.is_empty()
            && algorithm.chars().all(|c| {
                c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '.' | '_' | '-')
            });
        if !algorithm_ok {
            return Err(DigestError::InvalidAlgorithm(algorithm.to_string()));
        }

        if encoded.is_empty() {
            return Err(DigestError::EmptyEncoded);
        }

        for c in encoded.chars() {
            if !c.is_ascii_alphanumeric() && c != '=' && c != '_' && c != '-' {
                return Err(DigestError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn algorithm(&self) -> &str {
        self.0.split_once(':').map(|(a, _)| a).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Digest {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
