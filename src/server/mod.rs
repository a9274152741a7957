//! HTTP surface for the triage pipeline
//!
//! - `GET /healthz` returns `{"ok": true}`
//! - `POST /triage` runs one request through the pipeline

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::agent::TriagePipeline;
use crate::errors::{Result, TriageError};
use crate::types::{TriageRequest, TriageResponse};

type PipelineState = Arc<TriagePipeline>;
type ApiError = (StatusCode, Json<Value>);

/// Detail returned for any non-validation failure
pub const GENERIC_ERROR_DETAIL: &str = "Agent error";

/// Build the service router
pub fn router(pipeline: PipelineState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/triage", post(triage))
        .with_state(pipeline)
}

async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn triage(
    State(pipeline): State<PipelineState>,
    Json(request): Json<TriageRequest>,
) -> std::result::Result<Json<TriageResponse>, ApiError> {
    // A panicking stage surfaces as a JoinError instead of dropping the connection
    let run = tokio::spawn(async move { pipeline.run(&request).await });
    match run.await {
        Ok(result) => result.map(Json).map_err(to_api_error),
        Err(e) => Err(to_api_error(TriageError::Processing(format!(
            "triage task aborted: {}",
            e
        )))),
    }
}

/// Map a pipeline error onto a status code and JSON detail
pub fn to_api_error(err: TriageError) -> ApiError {
    if err.is_client_error() {
        warn!(error = %err, "Rejected triage request");
        (StatusCode::BAD_REQUEST, Json(json!({ "detail": err.to_string() })))
    } else {
        error!(error = %err, "Triage failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": GENERIC_ERROR_DETAIL })),
        )
    }
}

/// Bind `bind` and serve until Ctrl-C
pub async fn serve(pipeline: PipelineState, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind).await?;
    let addr = listener.local_addr()?;
    info!(addr = %addr, provider = %pipeline.provider().provider, "Triage server listening");

    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Triage server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
