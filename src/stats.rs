//! Prediction statistics.
//!
//! Counters shared across concurrent requests. Nothing about individual
//! requests is retained beyond the counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Running counters for served prediction requests.
#[derive(Debug)]
pub struct PredictionStats {
    /// Requests that produced predictions
    requests_served: AtomicU64,
    /// Requests that failed at any stage
    requests_failed: AtomicU64,
    /// Prediction rows returned
    predictions_made: AtomicU64,
    /// Rows predicted as activated
    activations_predicted: AtomicU64,
    started_at: DateTime<Utc>,
}

impl PredictionStats {
    pub fn new() -> Self {
        Self {
            requests_served: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            predictions_made: AtomicU64::new(0),
            activations_predicted: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    /// Record a successful request and its row counts.
    pub fn record_success(&self, predictions: u64, activated: u64) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
        self.predictions_made.fetch_add(predictions, Ordering::Relaxed);
        self.activations_predicted
            .fetch_add(activated, Ordering::Relaxed);
    }

    /// Record a failed request.
    pub fn record_failure(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests_served: self.requests_served.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            predictions_made: self.predictions_made.load(Ordering::Relaxed),
            activations_predicted: self.activations_predicted.load(Ordering::Relaxed),
            started_at: self.started_at,
            uptime_secs: (Utc::now() - self.started_at).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Prediction Statistics:\n\
             - Requests served: {}\n\
             - Requests failed: {}\n\
             - Predictions made: {}\n\
             - Activations predicted: {}\n\
             - Uptime: {} seconds",
            stats.requests_served,
            stats.requests_failed,
            stats.predictions_made,
            stats.activations_predicted,
            stats.uptime_secs
        )
    }
}

impl Default for PredictionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub requests_served: u64,
    pub requests_failed: u64,
    pub predictions_made: u64,
    pub activations_predicted: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
}

/// Thread-safe shared statistics.
pub type SharedStats = Arc<PredictionStats>;
