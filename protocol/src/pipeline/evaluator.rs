//! Submission evaluation: authentication, reconciliation and freshness.
//!
//! [`TransactionPipeline::evaluate`] assumes the request already passed
//! [`validate_request`](crate::message::validate_request). It never returns
//! an error: anything that goes wrong inside [`TransactionPipeline::try_evaluate`]
//! is logged and reported as [`RejectReason::Unprocessable`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use super::outcome::{PipelineStage, RejectReason, TransactionOutcome, Verdict};
use crate::config::FRESHNESS_WINDOW;
use crate::crypto::{canonical_string, verify_signature};
use crate::directory::PartnerDirectory;
use crate::message::{ItemDetail, TimestampError, TransactionRequest};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Faults that stop evaluation outright. None of these reach the partner.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The timestamp could not be parsed. The validator should have caught it.
    #[error("unreadable timestamp: {0}")]
    Timestamp(#[from] TimestampError),

    /// `qty * unitprice` summed past `i64::MAX`.
    #[error("item total overflows at item {index}")]
    AmountOverflow { index: usize },

    /// The configured window cannot be represented or applied around `now`.
    #[error("freshness window of {window_secs}s is out of range")]
    WindowOutOfRange { window_secs: u64 },
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunables for [`TransactionPipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Half-width of the accepted window around server time.
    pub freshness_window: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            freshness_window: FRESHNESS_WINDOW,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Evaluates structurally valid submissions against a partner directory.
///
/// Cheap to clone and safe to share: the only state is the read-only
/// directory and the configuration.
#[derive(Clone)]
pub struct TransactionPipeline {
    directory: Arc<dyn PartnerDirectory>,
    config: PipelineConfig,
}

impl TransactionPipeline {
    pub fn new(directory: Arc<dyn PartnerDirectory>) -> Self {
        Self::with_config(directory, PipelineConfig::default())
    }

    pub fn with_config(directory: Arc<dyn PartnerDirectory>, config: PipelineConfig) -> Self {
        Self { directory, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Evaluate against the current server time.
    pub fn evaluate(&self, req: &TransactionRequest) -> Verdict {
        self.evaluate_at(req, Utc::now())
    }

    /// Evaluate and build the response payload in one step.
    pub fn submit(&self, req: &TransactionRequest) -> TransactionOutcome {
        self.evaluate(req).into()
    }

    /// Evaluate against an explicit `now`. Logs the request before and the
    /// outcome after; logging problems never change the verdict.
    pub fn evaluate_at(&self, req: &TransactionRequest, now: DateTime<Utc>) -> Verdict {
        log_request(req);

        let verdict = match self.try_evaluate(req, now) {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    partner_key = %req.partner_key,
                    partner_ref_no = %req.partner_ref_no,
                    "transaction evaluation failed"
                );
                Verdict::Rejected(RejectReason::Unprocessable)
            }
        };

        log_outcome(req, verdict);
        verdict
    }

    /// The four gates, in order. Business rejections are `Ok`; only faults
    /// are `Err`.
    pub fn try_evaluate(
        &self,
        req: &TransactionRequest,
        now: DateTime<Utc>,
    ) -> Result<Verdict, PipelineError> {
        let mut stage = PipelineStage::Unauthenticated;

        // 1. Credentials and signature share one gate and one message.
        //    The directory is asked first; a stranger's signature is never
        //    computed.
        if !self
            .directory
            .is_valid(&req.partner_key, &req.partner_password)
        {
            return Ok(reject(stage, RejectReason::AccessDenied, "unknown partner credentials"));
        }

        let timestamp = req.parsed_timestamp()?.with_timezone(&Utc);
        let canonical = canonical_string(
            &timestamp,
            &req.partner_key,
            &req.partner_ref_no,
            req.total_amount,
            &req.partner_password,
        );
        if !verify_signature(&canonical, &req.signature) {
            return Ok(reject(stage, RejectReason::AccessDenied, "signature mismatch"));
        }
        stage = PipelineStage::SignatureChecked;

        // 2. Declared total against the item lines.
        let items_total = items_total(&req.items)?;
        if items_total != req.total_amount {
            tracing::debug!(
                declared = req.total_amount,
                computed = items_total,
                "total amount mismatch"
            );
            return Ok(reject(stage, RejectReason::InvalidTotalAmount, "amount mismatch"));
        }
        stage = PipelineStage::AmountReconciled;

        // 3. [now - window, now + window)
        if !is_fresh(timestamp, now, self.config.freshness_window)? {
            tracing::debug!(
                timestamp = %timestamp,
                now = %now,
                window_secs = self.config.freshness_window.as_secs(),
                "timestamp outside freshness window"
            );
            return Ok(reject(stage, RejectReason::Expired, "stale or future timestamp"));
        }
        stage = PipelineStage::FreshnessChecked;

        tracing::debug!(from = %stage, to = %PipelineStage::Accepted, "all gates passed");
        Ok(Verdict::Accepted)
    }
}

impl std::fmt::Debug for TransactionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn reject(stage: PipelineStage, reason: RejectReason, detail: &str) -> Verdict {
    tracing::debug!(stage = %stage, reason = ?reason, detail, "submission rejected");
    Verdict::Rejected(reason)
}

/// Sum of `qty * unit_price`, 0 for no items. Checked all the way.
pub fn items_total(items: &[ItemDetail]) -> Result<i64, PipelineError> {
    items.iter().enumerate().try_fold(0i64, |acc, (index, item)| {
        i64::from(item.qty)
            .checked_mul(item.unit_price)
            .and_then(|line| acc.checked_add(line))
            .ok_or(PipelineError::AmountOverflow { index })
    })
}

/// `now - window <= timestamp < now + window`.
pub fn is_fresh(
    timestamp: DateTime<Utc>,
    now: DateTime<Utc>,
    window: Duration,
) -> Result<bool, PipelineError> {
    let out_of_range = || PipelineError::WindowOutOfRange {
        window_secs: window.as_secs(),
    };
    let delta = TimeDelta::from_std(window).map_err(|_| out_of_range())?;
    let earliest = now.checked_sub_signed(delta).ok_or_else(out_of_range)?;
    let latest = now.checked_add_signed(delta).ok_or_else(out_of_range)?;
    Ok(timestamp >= earliest && timestamp < latest)
}

fn log_request(req: &TransactionRequest) {
    match serde_json::to_string(&req.redacted()) {
        Ok(body) => tracing::info!(request = %body, "transaction submission received"),
        Err(e) => tracing::warn!(error = %e, "could not serialize submission for logging"),
    }
}

fn log_outcome(req: &TransactionRequest, verdict: Verdict) {
    let outcome = TransactionOutcome::from(verdict);
    match serde_json::to_string(&outcome) {
        Ok(body) => tracing::info!(
            partner_key = %req.partner_key,
            partner_ref_no = %req.partner_ref_no,
            verdict = verdict.label(),
            response = %body,
            "transaction submission evaluated"
        ),
        Err(e) => tracing::warn!(error = %e, "could not serialize outcome for logging"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
