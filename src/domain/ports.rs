use super::purchase::TransactionDescriptor;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// The three-call marketplace protocol.
///
/// Empty strings and an all-empty descriptor are the "nothing found" sentinels.
/// Adapters that keep transport failures distinct report them as `Err`.
#[async_trait]
pub trait MarketplaceGateway: Send + Sync {
    async fn search_recipient(&self, username: &str) -> Result<String>;
    async fn create_purchase_request(&self, recipient: &str, quantity: u32) -> Result<String>;
    async fn fetch_transaction_descriptor(
        &self,
        recipient: &str,
        request_id: &str,
        quantity: u32,
    ) -> Result<TransactionDescriptor>;
}

/// Signs and broadcasts the transfer. Returns the transaction identifier.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(
        &self,
        destination_address: &str,
        amount_display_units: f64,
        comment: &str,
    ) -> Result<String>;
}

pub type MarketplaceBox = Box<dyn MarketplaceGateway>;
pub type SubmitterHandle = Arc<dyn TransactionSubmitter>;
