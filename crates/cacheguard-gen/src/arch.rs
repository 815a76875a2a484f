//! Architecture identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

/// A `target_arch` value such as `x86_64` or `wasm32`.
///
/// Identity is the raw string. Two identifiers are equal only if their
/// text is equal; no case folding or other normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArchitectureId(String);

impl ArchitectureId {
    /// Validate and wrap an identifier.
    ///
    /// Accepts non-empty tokens made of ASCII lowercase letters, digits
    /// and `_`, which covers every `target_arch` rustc reports and keeps
    /// the token safe to splice into a `cfg` string literal.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if let Some(detail) = invalid_token(&id) {
            return Err(GenError::InvalidArchitecture { id, detail });
        }
        Ok(Self(id))
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identifier starts with `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

/// Returns a description of the problem if `token` is not a valid identifier.
pub(crate) fn invalid_token(token: &str) -> Option<String> {
    if token.is_empty() {
        return Some("empty".into());
    }
    token
        .chars()
        .find(|&c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'))
        .map(|c| format!("unexpected character {c:?}"))
}

impl fmt::Display for ArchitectureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for ArchitectureId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ArchitectureId {
    type Error = GenError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ArchitectureId> for String {
    fn from(id: ArchitectureId) -> String {
        id.0
    }
}

impl std::str::FromStr for ArchitectureId {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Parse a list of identifiers, failing on the first invalid one.
pub fn parse_all<I, S>(ids: I) -> Result<Vec<ArchitectureId>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ids.into_iter().map(ArchitectureId::new).collect()
}
