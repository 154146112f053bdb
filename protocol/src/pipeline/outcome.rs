//! Pipeline results and the response payload built from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{
    MESSAGE_ACCESS_DENIED, MESSAGE_EXPIRED, MESSAGE_INVALID_TOTAL_AMOUNT, MESSAGE_REQUEST_VALID,
    MESSAGE_UNPROCESSABLE,
};

// ---------------------------------------------------------------------------
// PipelineStage
// ---------------------------------------------------------------------------

/// How far a submission got. Stages are strictly ordered; a submission
/// rejected at one stage never reaches the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    /// Nothing verified yet.
    Unauthenticated,
    /// Credentials and signature verified.
    SignatureChecked,
    /// Item lines add up to the declared total.
    AmountReconciled,
    /// Timestamp inside the freshness window.
    FreshnessChecked,
    /// Every gate passed.
    Accepted,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::SignatureChecked => write!(f, "signature_checked"),
            Self::AmountReconciled => write!(f, "amount_reconciled"),
            Self::FreshnessChecked => write!(f, "freshness_checked"),
            Self::Accepted => write!(f, "accepted"),
        }
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Why a submission was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Unknown partner, wrong password, or signature mismatch.
    AccessDenied,
    /// Item lines do not add up to `totalamount`.
    InvalidTotalAmount,
    /// Timestamp outside the freshness window.
    Expired,
    /// Evaluation failed unexpectedly.
    Unprocessable,
}

impl RejectReason {
    /// The partner-facing result message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::AccessDenied => MESSAGE_ACCESS_DENIED,
            Self::InvalidTotalAmount => MESSAGE_INVALID_TOTAL_AMOUNT,
            Self::Expired => MESSAGE_EXPIRED,
            Self::Unprocessable => MESSAGE_UNPROCESSABLE,
        }
    }
}

/// Final decision for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    /// Stable snake_case label for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Accepted => "accepted",
            Verdict::Rejected(RejectReason::AccessDenied) => "access_denied",
            Verdict::Rejected(RejectReason::InvalidTotalAmount) => "invalid_total_amount",
            Verdict::Rejected(RejectReason::Expired) => "expired",
            Verdict::Rejected(RejectReason::Unprocessable) => "unprocessable",
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionOutcome
// ---------------------------------------------------------------------------

/// Result flag on the wire: `1` for success, `0` for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OutcomeStatus {
    Failed,
    Success,
}

impl From<OutcomeStatus> for u8 {
    fn from(status: OutcomeStatus) -> u8 {
        match status {
            OutcomeStatus::Failed => 0,
            OutcomeStatus::Success => 1,
        }
    }
}

impl TryFrom<u8> for OutcomeStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OutcomeStatus::Failed),
            1 => Ok(OutcomeStatus::Success),
            other => Err(format!("invalid result flag: {other}")),
        }
    }
}

/// Response payload: `{ "result": 0|1, "resultmessage": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutcome {
    #[serde(rename = "result")]
    pub status: OutcomeStatus,
    #[serde(rename = "resultmessage")]
    pub message: String,
}

impl TransactionOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

impl From<Verdict> for TransactionOutcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accepted => TransactionOutcome {
                status: OutcomeStatus::Success,
                message: MESSAGE_REQUEST_VALID.to_string(),
            },
            Verdict::Rejected(reason) => TransactionOutcome {
                status: OutcomeStatus::Failed,
                message: reason.message().to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_maps_to_success() {
        let out = TransactionOutcome::from(Verdict::Accepted);
        assert!(out.is_success());
        assert_eq!(out.message, "Request data is valid.");
    }

    #[test]
    fn every_rejection_is_failed_with_its_message() {
        let cases = [
            (RejectReason::AccessDenied, "Access Denied!"),
            (RejectReason::InvalidTotalAmount, "Invalid Total Amount."),
            (RejectReason::Expired, "Expired."),
            (RejectReason::Unprocessable, "Request could not be processed."),
        ];
        for (reason, message) in cases {
            let out = TransactionOutcome::from(Verdict::Rejected(reason));
            assert_eq!(out.status, OutcomeStatus::Failed);
            assert_eq!(out.message, message);
        }
    }

    #[test]
    fn serializes_with_numeric_result() {
        let json = serde_json::to_value(TransactionOutcome::from(Verdict::Accepted)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "result": 1, "resultmessage": "Request data is valid." })
        );

        let json = serde_json::to_value(TransactionOutcome::from(Verdict::Rejected(
            RejectReason::Expired,
        )))
        .unwrap();
        assert_eq!(json["result"], 0);
    }

    #[test]
    fn rejects_unknown_result_flag() {
        let err = serde_json::from_str::<TransactionOutcome>(
            r#"{ "result": 2, "resultmessage": "?" }"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn stages_are_ordered() {
        assert!(PipelineStage::Unauthenticated < PipelineStage::SignatureChecked);
        assert!(PipelineStage::SignatureChecked < PipelineStage::AmountReconciled);
        assert!(PipelineStage::AmountReconciled < PipelineStage::FreshnessChecked);
        assert!(PipelineStage::FreshnessChecked < PipelineStage::Accepted);
    }

    #[test]
    fn labels_are_distinct() {
        let labels = [
            Verdict::Accepted.label(),
            Verdict::Rejected(RejectReason::AccessDenied).label(),
            Verdict::Rejected(RejectReason::InvalidTotalAmount).label(),
            Verdict::Rejected(RejectReason::Expired).label(),
            Verdict::Rejected(RejectReason::Unprocessable).label(),
        ];
        let mut sorted = labels.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), labels.len());
    }
}
