use crate::domain::purchase::FailureKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PurchaseError {
    #[error("Recipient not found: {0}")]
    NotFound(String),
    #[error("Purchase request rejected for recipient {0}")]
    RequestRejected(String),
    #[error("Transaction descriptor incomplete for request {0}")]
    DescriptorIncomplete(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid purchase request: {0}")]
    InvalidRequest(String),
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl PurchaseError {
    /// Classifies the error for reporting in a `PurchaseResult`.
    pub fn kind(&self) -> FailureKind {
        match self {
            PurchaseError::NotFound(_) => FailureKind::NotFound,
            PurchaseError::RequestRejected(_) => FailureKind::RequestRejected,
            PurchaseError::DescriptorIncomplete(_) | PurchaseError::InvalidAmount(_) => {
                FailureKind::DescriptorIncomplete
            }
            PurchaseError::InvalidRequest(_) | PurchaseError::Config(_) => {
                FailureKind::InvalidRequest
            }
            PurchaseError::SubmissionFailed(_) => FailureKind::SubmissionFailed,
            PurchaseError::Transport(_)
            | PurchaseError::IoError(_)
            | PurchaseError::JsonError(_)
            | PurchaseError::HttpError(_) => FailureKind::TransportFailure,
        }
    }
}

pub type Result<T> = std::result::Result<T, PurchaseError>;
