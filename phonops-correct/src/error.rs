//! Error types for phonops-correct organized by processing stage.

use thiserror::Error;

/// Correction pipeline error variants organized by processing stage.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration stage error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Phonemization collaborator error
    #[error(transparent)]
    Phonemizer(#[from] PhonemizerError),

    /// Lexicon, dictionary or settings loading error
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Configuration errors, raised before any scoring begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Segmental metric name not in the supported set
    #[error("unsupported segmental metric: {0}")]
    UnknownMetric(String),

    /// Feature distance name not in the supported set
    #[error("unsupported feature distance: {0}")]
    UnknownFeatureDistance(String),

    /// Weight below zero (or not a number)
    #[error("invalid weight for {name}: {value} (must be non-negative)")]
    NegativeWeight { name: String, value: f64 },

    /// Edit or confusion cost below zero (or not a number)
    #[error("invalid cost for {name}: {value} (must be non-negative)")]
    NegativeCost { name: String, value: f64 },

    /// No segmental metric configured
    #[error("at least one segmental metric is required")]
    NoMetrics,

    /// Every segmental metric has weight zero
    #[error("segmental metric weights sum to zero")]
    ZeroMetricWeight,

    /// Acceptance threshold is negative or not a number
    #[error("invalid threshold: {0} (must be non-negative)")]
    InvalidThreshold(f64),

    /// Confusion table key is not a pair of known classes
    #[error("malformed {axis} confusion key: {key:?} (expected \"a:b\")")]
    MalformedConfusionKey { axis: &'static str, key: String },
}

/// Failures of the phonemization collaborator.
#[derive(Debug, Error)]
pub enum PhonemizerError {
    /// Language tag has no pronunciation source
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Token has no known pronunciation
    #[error("no pronunciation for {text:?} ({language})")]
    UnknownToken { text: String, language: String },

    /// Output failed validation
    #[error("malformed phonemizer output for {text:?}: {reason}")]
    Malformed { text: String, reason: String },

    /// Opaque failure from an external backend
    #[error("phonemizer backend failed: {0}")]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// File loading errors (lexicon, dictionary, settings).
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error while reading
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON syntax or schema error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for phonops-correct operations.
pub type Result<T> = std::result::Result<T, Error>;

// Nested From implementations for automatic error conversion chains

// std::io::Error → LoadError → Error
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Load(LoadError::Io(e))
    }
}

// serde_json::Error → LoadError → Error
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Load(LoadError::Json(e))
    }
}
