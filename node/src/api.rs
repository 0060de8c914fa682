//! # HTTP Gateway
//!
//! Builds the axum router that exposes the ledger. All handlers share the
//! [`AppState`] through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path        | Description                                   |
//! |--------|-------------|-----------------------------------------------|
//! | GET    | `/`         | Ledger as indented JSON in HTML, plus a form  |
//! | POST   | `/`         | Append an encounter, then same page as GET    |
//! | GET    | `/health`   | Liveness probe                                |
//! | GET    | `/validate` | Full-chain integrity audit                    |
//!
//! A rejected block is not an HTTP error: the client gets the unchanged
//! ledger with status 200. The `x-block-appended` header tells the two
//! outcomes apart.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, HeaderName, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use medledger_protocol::config::{MAX_BODY_BYTES, REQUEST_TIMEOUT};
use medledger_protocol::storage::{Ledger, LedgerError, Record};

use crate::form::decode_record;
use crate::metrics::SharedMetrics;
use crate::page::render_ledger_page;

/// Response header reporting whether a POST extended the ledger.
pub const BLOCK_APPENDED_HEADER: HeaderName = HeaderName::from_static("x-block-appended");

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state. Cloned per request; the ledger and metrics sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// The one ledger this process serves.
    pub ledger: Arc<Ledger>,
    pub metrics: SharedMetrics,
}

impl AppState {
    /// Bundle the shared handles and seed the height gauge from `ledger`.
    ///
    /// After this the gauge only moves up, once per appended block.
    pub fn new(version: String, ledger: Arc<Ledger>, metrics: SharedMetrics) -> Self {
        metrics.ledger_height.set(ledger.len() as i64);
        Self {
            version,
            ledger,
            metrics,
        }
    }
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the gateway [`Router`] with tracing, a request timeout and a body
/// size limit.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ledger_page_handler).post(write_block_handler))
        .route("/health", get(health_handler))
        .route("/validate", get(validate_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response payload for `GET /validate`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    /// True when no faults were found.
    pub ok: bool,
    /// Number of blocks audited.
    pub height: u64,
    /// Human-readable description of each fault.
    pub errors: Vec<String>,
}

/// Response payload for `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /`: the ledger page.
async fn ledger_page_handler(State(state): State<AppState>) -> Response {
    render_page(&state, None)
}

/// `POST /`: decode an encounter, append it, and render the ledger.
///
/// Unreadable or undecodable bodies get a 500 echoing whatever part of the
/// record was decoded.
async fn write_block_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!("failed to read request body: {}", rejection);
            state.metrics.request_body_errors_total.inc();
            return echo_record(StatusCode::INTERNAL_SERVER_ERROR, &Record::default());
        }
    };

    let record = match decode_record(&body) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("failed to decode request body: {}", e);
            state.metrics.request_body_errors_total.inc();
            return echo_record(StatusCode::INTERNAL_SERVER_ERROR, e.partial());
        }
    };

    let timer = state.metrics.append_latency_seconds.start_timer();
    let outcome = state.ledger.append_record(&record);
    timer.observe_duration();

    let appended = match outcome {
        Ok(block) => {
            tracing::info!(index = block.index, hash = %block.hash, "block appended");
            state.metrics.blocks_appended_total.inc();
            state.metrics.ledger_height.inc();
            true
        }
        // Only reachable once the index space is exhausted.
        Err(LedgerError::Rejected(reason)) => {
            tracing::warn!(%reason, "candidate block rejected");
            state.metrics.blocks_rejected_total.inc();
            false
        }
        Err(LedgerError::Empty) => {
            tracing::error!("ledger has no tip; cannot append");
            return echo_record(StatusCode::INTERNAL_SERVER_ERROR, &record);
        }
    };

    render_page(&state, Some(appended))
}

/// `GET /health`: returns 200 while the process is serving.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".into(),
        version: state.version.clone(),
    })
}

/// `GET /validate`: audits every block and linkage in a snapshot.
async fn validate_handler(State(state): State<AppState>) -> impl IntoResponse {
    let blocks = state.ledger.snapshot();
    let errors: Vec<String> = medledger_protocol::storage::ledger::verify_chain(&blocks)
        .iter()
        .map(ToString::to_string)
        .collect();

    Json(ValidateResponse {
        ok: errors.is_empty(),
        height: blocks.len() as u64,
        errors,
    })
}

// ---------------------------------------------------------------------------
// Rendering Helpers
// ---------------------------------------------------------------------------

/// Render the ledger page from a fresh snapshot. `appended` is set for POST
/// responses and becomes the `x-block-appended` header.
fn render_page(state: &AppState, appended: Option<bool>) -> Response {
    let blocks = state.ledger.snapshot();

    let page = match render_ledger_page(&blocks) {
        Ok(page) => page,
        Err(e) => {
            tracing::error!("failed to serialize ledger: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    match appended {
        Some(appended) => (
            StatusCode::OK,
            [(BLOCK_APPENDED_HEADER, if appended { "true" } else { "false" })],
            Html(page),
        )
            .into_response(),
        None => (StatusCode::OK, Html(page)).into_response(),
    }
}

/// Respond with `record` as indented JSON.
fn echo_record(status: StatusCode, record: &Record) -> Response {
    match serde_json::to_string_pretty(record) {
        Ok(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "HTTP 500: Internal Server Error",
        )
            .into_response(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use medledger_protocol::storage::Block;
    use tower::ServiceExt;

    const GENESIS_TS: &str = "2026-10-16T09:30:00.000000000Z";

    /// Creates a test AppState around a fresh ledger.
    fn test_app_state() -> AppState {
        app_state_with(Block::genesis_at(GENESIS_TS))
    }

    fn app_state_with(genesis: Block) -> AppState {
        AppState::new(
            "0.1.0-test".into(),
            Arc::new(Ledger::with_genesis(genesis)),
            Arc::new(crate::metrics::NodeMetrics::new().expect("metrics")),
        )
    }

    /// Sends a GET request and returns the (status, body).
    async fn get(router: &Router, path: &str) -> (StatusCode, String) {
        let req = Request::builder().uri(path).body(Body::empty()).unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    /// Sends a form POST and returns the full response.
    async fn post_form(router: &Router, body: impl Into<Body>) -> Response {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body.into())
            .unwrap();
        router.clone().oneshot(req).await.unwrap()
    }

    async fn body_string(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    // -- 1. Read endpoint ------------------------------------------------------

    #[tokio::test]
    async fn get_root_renders_genesis_and_form() {
        let state = test_app_state();
        let genesis_hash = state.ledger.tip().unwrap().hash;
        let router = create_router(state);

        let (status, body) = get(&router, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"Index\": 0"));
        assert!(body.contains(&genesis_hash));
        assert!(body.contains("name=\"PatientInfo\""));
        assert!(body.contains("name=\"TestResults\""));
    }

    #[tokio::test]
    async fn get_root_is_html() {
        let router = create_router(test_app_state());
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = router.oneshot(req).await.unwrap();
        let content_type = resp.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
        assert!(resp.headers().get(&BLOCK_APPENDED_HEADER).is_none());
    }

    // -- 2. Write endpoint -----------------------------------------------------

    #[tokio::test]
    async fn post_appends_block_and_renders_chain() {
        let state = test_app_state();
        let ledger = Arc::clone(&state.ledger);
        let genesis = ledger.tip().unwrap();
        let router = create_router(state);

        let resp = post_form(
            &router,
            "PatientInfo=flu&ProblemList=cough&ConsultationReports=none&TestResults=neg",
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[&BLOCK_APPENDED_HEADER], "true");

        let body = body_string(resp).await;
        assert!(body.contains("\"Index\": 1"));
        assert!(body.contains("\"PatientInfo\": \"flu\""));

        let blocks = ledger.snapshot();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].index, 1);
        assert_eq!(blocks[1].previous_hash, genesis.hash);
        assert!(blocks[1].has_valid_hash());
    }

    #[tokio::test]
    async fn post_with_unknown_fields_only_appends_empty_block() {
        let state = test_app_state();
        let ledger = Arc::clone(&state.ledger);
        let router = create_router(state);

        let resp = post_form(&router, "Diagnosis=secret").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let tip = ledger.tip().unwrap();
        assert_eq!(tip.index, 1);
        assert!(tip.record().is_empty());
    }

    #[tokio::test]
    async fn post_with_invalid_utf8_echoes_partial_record() {
        let state = test_app_state();
        let ledger = Arc::clone(&state.ledger);
        let metrics = Arc::clone(&state.metrics);
        let router = create_router(state);

        let resp = post_form(&router, "PatientInfo=jane&ProblemList=%FF").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");

        let echoed: Record = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(echoed, Record::new("jane", "", "", ""));
        assert_eq!(ledger.len(), 1);
        assert_eq!(metrics.request_body_errors_total.get(), 1);
    }

    #[tokio::test]
    async fn post_with_oversized_body_is_rejected() {
        let state = test_app_state();
        let ledger = Arc::clone(&state.ledger);
        let router = create_router(state);

        let body = format!("PatientInfo={}", "x".repeat(MAX_BODY_BYTES + 1));
        let resp = post_form(&router, body).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let echoed: Record = serde_json::from_str(&body_string(resp).await).unwrap();
        assert!(echoed.is_empty());
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_posts_produce_contiguous_chain() {
        let state = test_app_state();
        let ledger = Arc::clone(&state.ledger);
        let metrics = Arc::clone(&state.metrics);
        let router = create_router(state);

        let requests = (0..32).map(|i| {
            let router = router.clone();
            tokio::spawn(async move {
                post_form(&router, format!("PatientInfo=patient{i}"))
                    .await
                    .status()
            })
        });
        let statuses = futures::future::join_all(requests).await;
        assert!(statuses
            .into_iter()
            .all(|s| s.expect("task panicked") == StatusCode::OK));

        let blocks = ledger.snapshot();
        assert_eq!(blocks.len(), 33);
        for (i, block) in blocks.iter().enumerate() {
            assert_eq!(block.index, i as u64);
        }
        assert!(ledger.verify().is_ok());
        assert_eq!(metrics.ledger_height.get(), 33);
        assert_eq!(metrics.blocks_appended_total.get(), 32);
    }

    #[tokio::test]
    async fn post_past_max_index_is_dropped_with_ok() {
        let mut last = Block::genesis_at(GENESIS_TS);
        last.index = u64::MAX;
        last.hash = last.compute_hash();
        let state = app_state_with(last.clone());
        let ledger = Arc::clone(&state.ledger);
        let metrics = Arc::clone(&state.metrics);
        let router = create_router(state);

        let resp = post_form(&router, "PatientInfo=flu").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[&BLOCK_APPENDED_HEADER], "false");

        let body = body_string(resp).await;
        assert!(body.contains(&last.hash));
        assert!(!body.contains("\"PatientInfo\": \"flu\""));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.tip().unwrap(), last);
        assert_eq!(metrics.blocks_rejected_total.get(), 1);
        assert_eq!(metrics.blocks_appended_total.get(), 0);
        assert_eq!(metrics.ledger_height.get(), 1);
    }

    #[tokio::test]
    async fn reads_do_not_move_height_gauge() {
        let state = test_app_state();
        let metrics = Arc::clone(&state.metrics);
        let router = create_router(state);
        assert_eq!(metrics.ledger_height.get(), 1);

        post_form(&router, "PatientInfo=a").await;
        metrics.ledger_height.set(7);
        get(&router, "/").await;
        post_form(&router, "PatientInfo=b").await;
        assert_eq!(metrics.ledger_height.get(), 8);
    }

    #[tokio::test]
    async fn metrics_track_appends() {
        let state = test_app_state();
        let metrics = Arc::clone(&state.metrics);
        let router = create_router(state);

        post_form(&router, "PatientInfo=a").await;
        post_form(&router, "PatientInfo=b").await;

        assert_eq!(metrics.blocks_appended_total.get(), 2);
        assert_eq!(metrics.blocks_rejected_total.get(), 0);
        assert_eq!(metrics.ledger_height.get(), 3);
        assert_eq!(metrics.append_latency_seconds.get_sample_count(), 2);
    }

    // -- 3. Auxiliary endpoints ------------------------------------------------

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let router = create_router(test_app_state());
        let (status, body) = get(&router, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let resp: HealthResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.version, "0.1.0-test");
    }

    #[tokio::test]
    async fn validate_reports_clean_chain() {
        let state = test_app_state();
        state
            .ledger
            .append_record(&Record::new("flu", "cough", "none", "neg"))
            .unwrap();
        let router = create_router(state);

        let (status, body) = get(&router, "/validate").await;
        assert_eq!(status, StatusCode::OK);
        let resp: ValidateResponse = serde_json::from_str(&body).unwrap();
        assert!(resp.ok);
        assert_eq!(resp.height, 2);
        assert!(resp.errors.is_empty());
    }

    #[tokio::test]
    async fn validate_reports_tampered_genesis() {
        let mut genesis = Block::genesis_at(GENESIS_TS);
        genesis.test_results = "forged".into();
        let router = create_router(app_state_with(genesis));

        let (_, body) = get(&router, "/validate").await;
        let resp: ValidateResponse = serde_json::from_str(&body).unwrap();
        assert!(!resp.ok);
        assert_eq!(resp.errors.len(), 1);
        assert!(resp.errors[0].contains("genesis hash mismatch"));
    }

    #[tokio::test]
    async fn unknown_method_is_not_allowed() {
        let router = create_router(test_app_state());
        let req = Request::builder()
            .method("DELETE")
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
