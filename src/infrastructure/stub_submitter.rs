use crate::domain::ports::TransactionSubmitter;
use crate::error::Result;
use async_trait::async_trait;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Placeholder submitter: signs and broadcasts nothing.
///
/// Returns `mock_transaction_hash_<unix seconds>` so the rest of the flow can
/// be exercised end to end. Swap in a real wallet-backed submitter for
/// production use.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubSubmitter;

impl StubSubmitter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransactionSubmitter for StubSubmitter {
    async fn submit(
        &self,
        destination_address: &str,
        amount_display_units: f64,
        comment: &str,
    ) -> Result<String> {
        warn!("stub submitter in use, no transaction is signed or broadcast");
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let tx_id = format!("mock_transaction_hash_{}", seconds);
        info!(
            destination = destination_address,
            amount = amount_display_units,
            comment,
            %tx_id,
            "transfer recorded"
        );
        Ok(tx_id)
    }
}
