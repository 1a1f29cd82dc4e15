//! HTTP server for model-backed activation predictions.
//!
//! This module provides an HTTP server that:
//! - Accepts a current time via POST /predict
//! - Runs the prediction pipeline against the configured devices
//! - Returns one prediction per (hour, device) slot
//!
//! # Architecture
//!
//! ```text
//! client ──→ POST /predict ──→ pipeline ──→ JSON predictions
//!                                 ↑
//!                     [shared read-only classifier]
//! ```

use crate::core::{predict_activations, ClassifierAdapter, Prediction};
use crate::data::DeviceRegistry;
use crate::error::PredictError;
use crate::stats::{PredictionStats, SharedStats, StatsSnapshot};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::error::Error as _;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Devices every request predicts for
    pub devices: DeviceRegistry,
    /// Classifier shared by all requests
    pub classifier: ClassifierAdapter,
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(port: u16, devices: DeviceRegistry, classifier: ClassifierAdapter) -> Self {
        Self {
            port,
            devices,
            classifier,
        }
    }
}

/// Shared server state. Built once at startup and never mutated per
/// request, apart from the atomic counters.
pub struct ServerState {
    classifier: ClassifierAdapter,
    devices: DeviceRegistry,
    stats: SharedStats,
}

impl ServerState {
    /// Create new server state
    pub fn new(config: ServerConfig) -> Self {
        Self {
            classifier: config.classifier,
            devices: config.devices,
            stats: Arc::new(PredictionStats::new()),
        }
    }
}

/// Body of POST /predict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Current time; predictions start at the next full hour
    pub timestamp: String,
}

/// Response from predict endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub request_id: Uuid,
    pub predictions: Vec<Prediction>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub classifier: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    /// Messages of the error and each of its sources, outermost first
    pub trace: Vec<String>,
}

impl ErrorResponse {
    fn from_error(err: &PredictError) -> Self {
        let mut trace = vec![err.to_string()];
        let mut source = err.source();
        while let Some(cause) = source {
            trace.push(cause.to_string());
            source = cause.source();
        }

        Self {
            error: err.to_string(),
            kind: err.kind().to_string(),
            trace,
        }
    }
}

/// GET /health
async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        classifier: state.classifier.variant().to_string(),
    })
}

/// GET /stats
async fn stats(State(state): State<Arc<ServerState>>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot())
}

/// POST /predict
///
/// Runs one forward pass of the pipeline. Failures, including bodies that
/// are not a prediction request, are reported as a structured error and
/// never affect other requests.
async fn predict(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request_id = Uuid::new_v4();

    let result = match payload {
        Ok(Json(request)) => {
            let span = tracing::info_span!("predict", %request_id, timestamp = %request.timestamp);
            span.in_scope(|| {
                predict_activations(&request.timestamp, &state.devices, &state.classifier)
            })
        }
        Err(rejection) => Err(PredictError::InvalidRequest {
            reason: rejection.body_text(),
        }),
    };

    match result {
        Ok(predictions) => {
            let activated = predictions.iter().filter(|p| p.activation_predicted).count();
            state
                .stats
                .record_success(predictions.len() as u64, activated as u64);
            tracing::info!(%request_id, rows = predictions.len(), activated, "Prediction served");
            Ok(Json(PredictResponse {
                request_id,
                predictions,
            }))
        }
        Err(err) => {
            state.stats.record_failure();
            let status = if err.is_input_error() {
                tracing::warn!(%request_id, kind = err.kind(), "Prediction rejected: {}", err);
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                tracing::error!(%request_id, kind = err.kind(), "Prediction failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            };
            Err((status, Json(ErrorResponse::from_error(&err))))
        }
    }
}

/// Build the router over shared state.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/predict", post(predict))
        .layer(
            CorsLayer::new()
                .allow_origin([
                    HeaderValue::from_static("http://localhost"),
                    HeaderValue::from_static("http://127.0.0.1"),
                ])
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: ServerConfig) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let port = config.port;
    let state = Arc::new(ServerState::new(config));
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Activation forecast server listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}
