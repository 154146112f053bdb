//! # Transaction Pipeline
//!
//! Runs a structurally valid submission through the gates that decide its
//! fate:
//!
//! ```text
//! Unauthenticated ──credentials + sig──▶ SignatureChecked
//!                 ──items == total───▶ AmountReconciled
//!                 ──fresh timestamp──▶ FreshnessChecked ──▶ Accepted
//! ```
//!
//! The first gate that fails decides the outcome. Faults inside evaluation
//! never escape: they become [`RejectReason::Unprocessable`].

pub mod evaluator;
pub mod outcome;

pub use evaluator::{is_fresh, items_total, PipelineConfig, PipelineError, TransactionPipeline};
pub use outcome::{OutcomeStatus, PipelineStage, RejectReason, TransactionOutcome, Verdict};
