//! Application layer: purchase orchestration.
//!
//! `PurchaseOrchestrator` sequences the marketplace calls, validates each
//! answer and hands the final transfer to a `TransactionSubmitter`.

pub mod orchestrator;
