//! Error types for the mintwatch service

use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport, timeout or HTTP failure talking to an upstream service
    #[error("Transient network error: {0}")]
    TransientNetwork(String),

    /// Signature or account not (yet) indexed by the provider
    #[error("Not found: {0}")]
    NotFound(String),

    /// NFT enrichment could not be completed
    #[error("Metadata unavailable: {0}")]
    MetadataUnavailable(String),

    /// Webhook never accepted the payload within the configured attempt cap
    #[error("Webhook rejected payload after {attempts} attempts (last status: {status:?})")]
    WebhookRejected { status: Option<u16>, attempts: u32 },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Short machine-readable label, used as a metrics label and in health output
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Validation(_) => "validation",
            AppError::TransientNetwork(_) => "transient_network",
            AppError::NotFound(_) => "not_found",
            AppError::MetadataUnavailable(_) => "metadata_unavailable",
            AppError::WebhookRejected { .. } => "webhook_rejected",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::TransientNetwork(e.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
