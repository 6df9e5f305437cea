use crate::domain::ports::TransactionSubmitter;
use crate::error::{PurchaseError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Transaction id reported for transfers held back by a dry run.
pub const DRY_RUN_TX_ID: &str = "dry_run";

/// Arguments received by [`RecordingSubmitter`].
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub destination_address: String,
    pub amount_display_units: f64,
    pub comment: String,
}

#[derive(Debug, Clone)]
pub enum SubmitBehaviour {
    Return(String),
    Fail(String),
    #[cfg(test)]
    Panic,
}

/// A submitter that keeps transfers in memory instead of broadcasting them.
///
/// Backs `buy --dry-run`: the marketplace flow runs for real and the prepared
/// transfer is reported back. Clones share the recorded submissions.
#[derive(Debug, Clone)]
pub struct RecordingSubmitter {
    behaviour: SubmitBehaviour,
    submissions: Arc<RwLock<Vec<Submission>>>,
}

impl RecordingSubmitter {
    pub fn new(behaviour: SubmitBehaviour) -> Self {
        Self {
            behaviour,
            submissions: Arc::default(),
        }
    }

    pub fn returning(tx_id: impl Into<String>) -> Self {
        Self::new(SubmitBehaviour::Return(tx_id.into()))
    }

    pub fn dry_run() -> Self {
        Self::returning(DRY_RUN_TX_ID)
    }

    pub async fn submissions(&self) -> Vec<Submission> {
        self.submissions.read().await.clone()
    }
}

#[async_trait]
impl TransactionSubmitter for RecordingSubmitter {
    async fn submit(
        &self,
        destination_address: &str,
        amount_display_units: f64,
        comment: &str,
    ) -> Result<String> {
        self.submissions.write().await.push(Submission {
            destination_address: destination_address.to_string(),
            amount_display_units,
            comment: comment.to_string(),
        });
        match &self.behaviour {
            SubmitBehaviour::Return(tx_id) => Ok(tx_id.clone()),
            SubmitBehaviour::Fail(message) => {
                Err(PurchaseError::SubmissionFailed(message.clone()))
            }
            #[cfg(test)]
            SubmitBehaviour::Panic => panic!("scripted submitter panic"),
        }
    }
}
