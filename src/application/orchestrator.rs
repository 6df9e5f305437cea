use crate::config::PurchaseLimits;
use crate::domain::payload::PayloadDecoder;
use crate::domain::ports::{MarketplaceBox, SubmitterHandle};
use crate::domain::purchase::{PurchaseRequest, PurchaseResult, PurchaseState};
use crate::error::{PurchaseError, Result};
use std::sync::Arc;
use tokio::task::AbortHandle;
use tracing::{info, warn};

/// Drives one purchase through the marketplace protocol and hands the
/// resulting transfer to the submitter.
///
/// Steps run strictly in order and any failure ends the attempt; nothing is
/// retried or resumed. Marketplace calls are awaited without a deadline unless
/// the gateway itself applies one, so a hung call stalls the attempt.
pub struct PurchaseOrchestrator {
    marketplace: MarketplaceBox,
    submitter: SubmitterHandle,
    decoder: PayloadDecoder,
    limits: PurchaseLimits,
}

impl PurchaseOrchestrator {
    /// Creates a new `PurchaseOrchestrator` accepting any positive quantity.
    /// Use [`with_limits`](Self::with_limits) to apply the service range.
    ///
    /// # Arguments
    ///
    /// * `marketplace` - The marketplace gateway for the three protocol calls.
    /// * `submitter` - The capability that signs and broadcasts the transfer.
    pub fn new(marketplace: MarketplaceBox, submitter: SubmitterHandle) -> Self {
        Self {
            marketplace,
            submitter,
            decoder: PayloadDecoder::new(),
            limits: PurchaseLimits::UNBOUNDED,
        }
    }

    pub fn with_limits(mut self, limits: PurchaseLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_decoder(mut self, decoder: PayloadDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Runs a purchase attempt to completion. Never returns an error: failures
    /// are reported in the `PurchaseResult`.
    ///
    /// Must be polled inside a Tokio runtime: the submitter runs on a spawned
    /// task. Dropping the returned future aborts that task, so a submission
    /// still in flight is cancelled at its next await point.
    pub async fn purchase(&self, request: &PurchaseRequest) -> PurchaseResult {
        let mut state = PurchaseState::Idle;
        match self.run(request, &mut state).await {
            Ok(tx_id) => {
                info!(%tx_id, "purchase succeeded");
                PurchaseResult::succeeded(tx_id)
            }
            Err(error) => {
                warn!(reached = ?state, %error, "purchase failed");
                PurchaseResult::failed(state, &error)
            }
        }
    }

    async fn run(&self, request: &PurchaseRequest, state: &mut PurchaseState) -> Result<String> {
        self.limits.check(request.quantity)?;

        let recipient = self.marketplace.search_recipient(&request.username).await?;
        if recipient.is_empty() {
            return Err(PurchaseError::NotFound(request.username.clone()));
        }
        advance(state, PurchaseState::RecipientResolved);

        let request_id = self
            .marketplace
            .create_purchase_request(&recipient, request.quantity)
            .await?;
        if request_id.is_empty() {
            return Err(PurchaseError::RequestRejected(recipient));
        }
        advance(state, PurchaseState::RequestCreated);

        let descriptor = self
            .marketplace
            .fetch_transaction_descriptor(&recipient, &request_id, request.quantity)
            .await?;
        if !descriptor.is_complete() {
            return Err(PurchaseError::DescriptorIncomplete(request_id));
        }
        advance(state, PurchaseState::DescriptorFetched);

        let amount = descriptor.amount_display_units()?;
        if amount <= 0.0 {
            return Err(PurchaseError::InvalidAmount(format!(
                "{} nano-units",
                descriptor.amount_nano_units
            )));
        }
        info!(
            amount = %descriptor.amount_decimal()?,
            destination = %descriptor.destination_address,
            "transfer prepared"
        );

        let comment = self
            .decoder
            .decode(&descriptor.payload_base64, request.quantity)
            .into_text();

        advance(state, PurchaseState::Submitted);
        let tx_id = self
            .submit(descriptor.destination_address, amount, comment)
            .await?;
        if tx_id.is_empty() {
            return Err(PurchaseError::SubmissionFailed(
                "submitter returned an empty transaction id".to_string(),
            ));
        }
        Ok(tx_id)
    }

    /// Runs the submitter on its own task so a panic inside it is contained.
    async fn submit(&self, destination: String, amount: f64, comment: String) -> Result<String> {
        let submitter = Arc::clone(&self.submitter);
        let task = tokio::spawn(async move {
            submitter.submit(&destination, amount, &comment).await
        });
        let _guard = AbortOnDrop(task.abort_handle());
        let outcome = task
            .await
            .map_err(|e| PurchaseError::SubmissionFailed(format!("submitter aborted: {}", e)))?;

        outcome.map_err(|e| match e {
            PurchaseError::SubmissionFailed(_) => e,
            other => PurchaseError::SubmissionFailed(other.to_string()),
        })
    }
}

struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn advance(state: &mut PurchaseState, next: PurchaseState) {
    info!(from = ?state, to = ?next, "purchase step");
    *state = next;
}
