//! Error types for layout rule generation.

use std::path::PathBuf;

/// Errors that can occur while generating layout rules.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// An architecture identifier is not a valid `target_arch` token.
    #[error("invalid architecture identifier {id:?}: {detail}")]
    InvalidArchitecture {
        /// The rejected identifier.
        id: String,
        /// Why it was rejected.
        detail: String,
    },

    /// The compiler toolchain could not be queried.
    #[error("toolchain query `{command}` failed: {detail}")]
    Toolchain {
        /// The command line that was run.
        command: String,
        /// Description of the failure.
        detail: String,
    },

    /// The rule table failed validation.
    #[error("invalid rule table: {detail}")]
    InvalidRules {
        /// The validation errors, separated by `; `.
        detail: String,
    },

    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// I/O error reading inputs or writing the generated file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input file not found.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },
}

/// Result type for generator operations.
pub type Result<T> = std::result::Result<T, GenError>;
