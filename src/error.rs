//! Error taxonomy shared by aggregation, scoring, training, and inference.

use thiserror::Error;

/// Errors surfaced by the core.
#[derive(Debug, Error)]
pub enum InsightError {
    /// Malformed or missing input columns. Always the caller's fault.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A trained artifact failed to load at startup.
    #[error("{artifact} unavailable: {reason}")]
    ModelUnavailable {
        artifact: &'static str,
        reason: String,
    },

    /// Unexpected numeric failure; indicates a bug rather than bad input.
    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl InsightError {
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }

    pub fn unavailable(artifact: &'static str, reason: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            artifact,
            reason: reason.into(),
        }
    }

    /// HTTP-equivalent status class at the request boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Schema(_) => 400,
            Self::ModelUnavailable { .. } => 503,
            _ => 500,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Schema(_) => "SCHEMA_ERROR",
            Self::ModelUnavailable { .. } => "MODEL_UNAVAILABLE",
            Self::Computation(_) => "COMPUTATION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Csv(_) => "CSV_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, InsightError>;
