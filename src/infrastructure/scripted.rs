use crate::domain::ports::MarketplaceGateway;
use crate::domain::purchase::TransactionDescriptor;
use crate::error::{PurchaseError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A marketplace call as seen by [`ScriptedMarketplace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketplaceCall {
    SearchRecipient {
        username: String,
    },
    CreatePurchaseRequest {
        recipient: String,
        quantity: u32,
    },
    FetchTransactionDescriptor {
        recipient: String,
        request_id: String,
        quantity: u32,
    },
}

/// An in-memory marketplace with canned answers.
///
/// Clones share the call log, so a test can keep a handle while the
/// orchestrator owns the boxed gateway.
#[derive(Debug, Default, Clone)]
pub struct ScriptedMarketplace {
    recipient: String,
    request_id: String,
    descriptor: TransactionDescriptor,
    transport_failure: Option<String>,
    calls: Arc<RwLock<Vec<MarketplaceCall>>>,
}

impl ScriptedMarketplace {
    /// Creates a marketplace that finds nothing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = recipient.into();
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_descriptor(mut self, descriptor: TransactionDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Every call fails with `PurchaseError::Transport`.
    pub fn failing_with(mut self, message: impl Into<String>) -> Self {
        self.transport_failure = Some(message.into());
        self
    }

    pub async fn calls(&self) -> Vec<MarketplaceCall> {
        self.calls.read().await.clone()
    }

    async fn record(&self, call: MarketplaceCall) -> Result<()> {
        self.calls.write().await.push(call);
        match &self.transport_failure {
            Some(message) => Err(PurchaseError::Transport(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MarketplaceGateway for ScriptedMarketplace {
    async fn search_recipient(&self, username: &str) -> Result<String> {
        self.record(MarketplaceCall::SearchRecipient {
            username: username.to_string(),
        })
        .await?;
        Ok(self.recipient.clone())
    }

    async fn create_purchase_request(&self, recipient: &str, quantity: u32) -> Result<String> {
        self.record(MarketplaceCall::CreatePurchaseRequest {
            recipient: recipient.to_string(),
            quantity,
        })
        .await?;
        Ok(self.request_id.clone())
    }

    async fn fetch_transaction_descriptor(
        &self,
        recipient: &str,
        request_id: &str,
        quantity: u32,
    ) -> Result<TransactionDescriptor> {
        self.record(MarketplaceCall::FetchTransactionDescriptor {
            recipient: recipient.to_string(),
            request_id: request_id.to_string(),
            quantity,
        })
        .await?;
        Ok(self.descriptor.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_marketplace_records_calls() {
        let market = ScriptedMarketplace::new()
            .with_recipient("user123")
            .with_request_id("req456");
        let handle = market.clone();

        assert_eq!(market.search_recipient("@alice").await.unwrap(), "user123");
        assert_eq!(
            market.create_purchase_request("user123", 50).await.unwrap(),
            "req456"
        );

        let calls = handle.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            MarketplaceCall::SearchRecipient {
                username: "@alice".into()
            }
        );
    }

    #[tokio::test]
    async fn test_scripted_transport_failure() {
        let market = ScriptedMarketplace::new().failing_with("connection refused");
        assert!(matches!(
            market.search_recipient("@alice").await,
            Err(PurchaseError::Transport(_))
        ));
        assert_eq!(market.calls().await.len(), 1);
    }
}
