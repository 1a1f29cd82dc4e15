//! Activation Forecast - hourly per-device activation prediction.
//!
//! Given raw activation-sensor readings and a current time, this library
//! predicts for each known device whether activation will occur in each of
//! the next 24 hourly slots.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Activation Forecast                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌────────────┐   ┌───────────┐ │
//! │  │   Slot    │──▶│  Feature  │──▶│ Classifier │──▶│  Result   │ │
//! │  │ Expander  │   │  Encoder  │   │  Adapter   │   │ Assembler │ │
//! │  └───────────┘   └───────────┘   └────────────┘   └───────────┘ │
//! │                        │                │                       │
//! │                        ▼                ▼                       │
//! │                  ┌───────────┐   ┌────────────┐                 │
//! │                  │  Device   │   │  Baseline  │                 │
//! │                  │ Registry  │   │  or Model  │                 │
//! │                  └───────────┘   └────────────┘                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use activation_forecast::{predict_activations, ClassifierAdapter, DeviceRegistry};
//!
//! let devices = DeviceRegistry::from_list(["device_1", "device_2"]);
//! let classifier = ClassifierAdapter::baseline(1000, &devices);
//!
//! let predictions = predict_activations("2020-01-01T23:30:00", &devices, &classifier).unwrap();
//! assert_eq!(predictions.len(), 48);
//! ```

pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod stats;

#[cfg(feature = "server")]
pub mod server;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use core::{
    predict_activations, resample_hourly, ActivationModel, ClassifierAdapter, FeatureTable,
    Label, ModelBundle, Prediction, Vocabulary,
};
pub use data::{DeviceRegistry, Reading};
pub use error::{DataError, ModelError, PredictError};
pub use stats::{PredictionStats, SharedStats, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
