//! # REST API
//!
//! Builds the axum router that exposes the gateway's HTTP interface.
//! All endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                    | Description                       |
//! |--------|-------------------------|-----------------------------------|
//! | POST   | `/api/submittrxmessage` | Submit a signed partner request   |
//! | GET    | `/api/testapi`          | Partner-facing liveness check     |
//! | GET    | `/health`               | Liveness probe                    |
//! | GET    | `/status`               | Gateway status summary            |

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use trxgate_protocol::message::{validate_request, StructuralError, TransactionRequest};
use trxgate_protocol::pipeline::{RejectReason, TransactionOutcome, TransactionPipeline, Verdict};

use crate::metrics::SharedMetrics;

/// Header carrying the per-submission id, also recorded on the log span.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone, everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The gateway's reported version string.
    pub version: String,
    /// Evaluates structurally valid submissions.
    pub pipeline: Arc<TransactionPipeline>,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
    /// Number of partners the directory was loaded with.
    pub partner_count: usize,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/submittrxmessage", post(submit_handler))
        .route("/api/testapi", get(testapi_handler))
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Problem body returned for submissions refused before evaluation.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub title: String,
    pub status: u16,
    /// Field path to messages. Absent for an unreadable request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ProblemDetails {
    const VALIDATION_TITLE: &'static str = "One or more validation errors occurred.";
    const UNREADABLE_TITLE: &'static str = "The request could not be read.";

    fn from_structural(err: &StructuralError) -> Self {
        match err {
            StructuralError::Violations(violations) => {
                let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
                for v in violations {
                    errors
                        .entry(v.field.clone())
                        .or_default()
                        .push(v.message.clone());
                }
                Self {
                    title: Self::VALIDATION_TITLE.into(),
                    status: StatusCode::BAD_REQUEST.as_u16(),
                    errors: Some(errors),
                }
            }
            StructuralError::MalformedTimestamp(_) => Self {
                title: Self::UNREADABLE_TITLE.into(),
                status: StatusCode::BAD_REQUEST.as_u16(),
                errors: None,
            },
        }
    }
}

/// Body of `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub partners: usize,
    pub freshness_window_secs: u64,
    /// Server time, RFC 3339. Partners compare against it when diagnosing
    /// `Expired.` results.
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `POST /api/submittrxmessage`: validate, then evaluate one submission.
///
/// Structural failures answer 400 with a problem body. Anything that gets
/// past the validator answers 200 with `{ result, resultmessage }`, including
/// rejections.
async fn submit_handler(
    State(state): State<AppState>,
    Json(req): Json<TransactionRequest>,
) -> Response {
    state.metrics.submissions_total.inc();

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("submission", request_id = %request_id);

    let response = async {
        if let Err(e) = validate_request(&req) {
            state.metrics.structural_rejections_total.inc();
            tracing::info!(
                error = %e,
                partner_key = %req.partner_key,
                partner_ref_no = %req.partner_ref_no,
                "submission failed structural validation"
            );
            let problem = ProblemDetails::from_structural(&e);
            return (StatusCode::BAD_REQUEST, Json(problem)).into_response();
        }

        let verdict = evaluate(&state, req).await;
        state.metrics.record_verdict(verdict);
        (StatusCode::OK, Json(TransactionOutcome::from(verdict))).into_response()
    }
    .instrument(span)
    .await;

    with_request_id(response, request_id)
}

/// Runs the pipeline off the async workers. The directory may block.
async fn evaluate(state: &AppState, req: TransactionRequest) -> Verdict {
    let pipeline = Arc::clone(&state.pipeline);
    let span = tracing::Span::current();
    let timer = state.metrics.evaluation_latency_seconds.start_timer();

    let result =
        tokio::task::spawn_blocking(move || span.in_scope(|| pipeline.evaluate(&req))).await;
    timer.observe_duration();

    match result {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::error!(error = %e, "evaluation task failed");
            Verdict::Rejected(RejectReason::Unprocessable)
        }
    }
}

fn with_request_id(mut response: Response, request_id: Uuid) -> Response {
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// `GET /api/testapi`: the check partners run against their integration.
async fn testapi_handler() -> impl IntoResponse {
    Json("Hello World!")
}

/// `GET /health`: returns 200 if the process is alive.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `GET /status`: version and configuration summary.
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        version: state.version.clone(),
        partners: state.partner_count,
        freshness_window_secs: state.pipeline.config().freshness_window.as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
