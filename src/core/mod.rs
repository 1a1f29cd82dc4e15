//! Core prediction pipeline.
//!
//! This module contains:
//! - Time-slot expansion from a request's current time
//! - Categorical feature encoding and closed vocabularies
//! - The classifier adapter and the trained model capability
//! - Result assembly and the end-to-end pipeline
//! - Hourly resampling of raw readings

pub mod assembler;
pub mod classifier;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod slots;
pub mod vocabulary;
pub mod windowing;

// Re-export commonly used types
pub use assembler::{assemble, Prediction};
pub use classifier::{BaselineClassifier, ClassifierAdapter, Label, ModelBackedClassifier};
pub use features::{encode_features, FeatureRow, FeatureTable, SlotKey};
pub use model::{ActivationModel, LogisticModel, ModelBundle};
pub use pipeline::predict_activations;
pub use slots::{expand_slots, next_slots, parse_timestamp, HORIZON_HOURS};
pub use vocabulary::{CategoryList, EncodedRow, FeatureField, Vocabulary};
pub use windowing::{resample_hourly, HourlyActivation, MAX_RESAMPLE_HOURS};
