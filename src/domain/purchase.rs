use crate::error::{PurchaseError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of nano-units in one display unit (TON).
pub const NANO_PER_UNIT: u64 = 1_000_000_000;

const EXPLORER_TEMPLATES: [&str; 2] = [
    "https://tonviewer.com/transaction/",
    "https://tonscan.org/tx/",
];

/// A request to buy `quantity` Stars for the marketplace handle `username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub username: String,
    pub quantity: u32,
}

impl PurchaseRequest {
    pub fn new(username: impl Into<String>, quantity: u32) -> Result<Self> {
        let username = username.into();
        if username.trim_start_matches('@').trim().is_empty() {
            return Err(PurchaseError::InvalidRequest(
                "username must not be empty".to_string(),
            ));
        }
        if quantity == 0 {
            return Err(PurchaseError::InvalidRequest(
                "quantity must be positive".to_string(),
            ));
        }
        Ok(Self { username, quantity })
    }
}

/// Blockchain transfer parameters returned by the buy-link call.
///
/// The marketplace signals failure by omitting fields, so an all-empty
/// descriptor is the failure sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionDescriptor {
    pub destination_address: String,
    pub amount_nano_units: String,
    pub payload_base64: String,
}

impl TransactionDescriptor {
    pub fn new(
        destination_address: impl Into<String>,
        amount_nano_units: impl Into<String>,
        payload_base64: impl Into<String>,
    ) -> Self {
        Self {
            destination_address: destination_address.into(),
            amount_nano_units: amount_nano_units.into(),
            payload_base64: payload_base64.into(),
        }
    }

    /// True when every required field is present.
    pub fn is_complete(&self) -> bool {
        !self.destination_address.is_empty()
            && !self.amount_nano_units.is_empty()
            && !self.payload_base64.is_empty()
    }

    /// Parses the decimal nano-unit amount.
    pub fn amount_nano(&self) -> Result<u64> {
        self.amount_nano_units
            .trim()
            .parse::<u64>()
            .map_err(|e| {
                PurchaseError::InvalidAmount(format!("{:?}: {}", self.amount_nano_units, e))
            })
    }

    /// Amount in display units, as handed to the submitter.
    pub fn amount_display_units(&self) -> Result<f64> {
        Ok(nano_to_display(self.amount_nano()?))
    }

    /// Exact amount in display units, for logs and reports.
    pub fn amount_decimal(&self) -> Result<Decimal> {
        Ok(Decimal::from_i128_with_scale(self.amount_nano()? as i128, 9).normalize())
    }
}

pub fn nano_to_display(nano: u64) -> f64 {
    nano as f64 / NANO_PER_UNIT as f64
}

/// Steps of a single purchase attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseState {
    #[default]
    Idle,
    RecipientResolved,
    RequestCreated,
    DescriptorFetched,
    Submitted,
    Succeeded,
    Failed,
}

impl PurchaseState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PurchaseState::Succeeded | PurchaseState::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidRequest,
    NotFound,
    RequestRejected,
    DescriptorIncomplete,
    SubmissionFailed,
    TransportFailure,
}

/// Terminal value of a purchase attempt.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PurchaseResult {
    pub success: bool,
    pub transaction_id: String,
    /// Last non-terminal state reached before the attempt ended.
    pub reached: PurchaseState,
    pub failure: Option<FailureKind>,
    pub diagnostic: Option<String>,
}

impl PurchaseResult {
    pub fn succeeded(transaction_id: impl Into<String>) -> Self {
        Self {
            success: true,
            transaction_id: transaction_id.into(),
            reached: PurchaseState::Submitted,
            failure: None,
            diagnostic: None,
        }
    }

    pub fn failed(reached: PurchaseState, error: &PurchaseError) -> Self {
        Self {
            success: false,
            transaction_id: String::new(),
            reached,
            failure: Some(error.kind()),
            diagnostic: Some(error.to_string()),
        }
    }

    pub fn state(&self) -> PurchaseState {
        if self.success {
            PurchaseState::Succeeded
        } else {
            PurchaseState::Failed
        }
    }

    /// Public explorer URLs for the transaction, empty on failure.
    pub fn explorer_links(&self) -> Vec<String> {
        if !self.success || self.transaction_id.is_empty() {
            return Vec::new();
        }
        EXPLORER_TEMPLATES
            .iter()
            .map(|base| format!("{}{}", base, self.transaction_id))
            .collect()
    }
}
