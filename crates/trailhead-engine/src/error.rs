//! Error types for the campaign engine.

/// Errors raised by campaign state machine operations.
///
/// These are fatal to the operation that triggered them, thrown
/// synchronously, never retried. The state record is left untouched when
/// one is returned.
#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    /// A role id was not found in the role catalog.
    #[error("unknown role \"{role_id}\"")]
    UnknownRole {
        /// The id that failed the lookup.
        role_id: String,
    },

    /// A launch timing option carried a month outside `[1, 12]`.
    #[error("invalid launch timing option: month {month} is out of range")]
    InvalidTimingOption {
        /// The rejected month value.
        month: u32,
    },
}

/// Errors that can occur when loading configuration or catalogs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a configuration or catalog file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// Failed to parse a JSON catalog.
    #[error("failed to parse catalog JSON: {source}")]
    Json {
        /// The underlying JSON parse error.
        #[from]
        source: serde_json::Error,
    },

    /// A required prompt block was absent from the prompt catalog.
    #[error("missing prompt block \"{key}\"")]
    MissingPromptBlock {
        /// The block key that was required.
        key: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}
