//! Error types and load result structures for the rule repository.

use std::path::PathBuf;

/// Errors that abort loading a rule set. No partial rule set is ever built.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error in {source_name}: {error}")]
    Yaml {
        source_name: String,
        #[source]
        error: serde_yaml::Error,
    },

    /// JSON parse/deserialization error.
    #[error("JSON parse error in {source_name}: {error}")]
    Json {
        source_name: String,
        #[source]
        error: serde_json::Error,
    },

    /// A rule failed load-time validation.
    #[error("invalid rule #{index} ('{label}'): {message}")]
    Validation {
        index: usize,
        label: String,
        message: String,
    },

    /// The file header (`apiVersion` / `kind`) is not one we understand.
    #[error("invalid rule file {source_name}: {message}")]
    InvalidDocument { source_name: String, message: String },

    /// A rule file path with an extension other than yml/yaml/json.
    #[error("unsupported rule file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Result alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;

/// Outcome of visiting a single path during a directory load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
    pub path: PathBuf,
    pub status: LoadStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    /// File parsed and validated; contributed `rules` rules.
    Loaded { rules: usize },
    /// File was skipped (dotfile, unsupported extension).
    Skipped { reason: String },
}
