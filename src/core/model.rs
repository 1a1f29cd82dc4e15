//! Trained classifier capability.
//!
//! How a model is trained is outside this crate. A model is anything that
//! maps encoded feature rows to raw class labels, one per row, in input
//! order. `LogisticModel` is the reference implementation loaded from a
//! JSON bundle produced by the training side.

use crate::core::vocabulary::{EncodedRow, FeatureField, Vocabulary};
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw class label for an activated slot.
pub const CLASS_ACTIVATED: &[u8] = b"True";

/// Raw class label for a slot without activation.
pub const CLASS_NOT_ACTIVATED: &[u8] = b"False";

/// A trained binary classifier over encoded categorical rows.
///
/// Implementations are shared read-only across concurrent requests and
/// must not mutate internal state during prediction.
pub trait ActivationModel: Send + Sync {
    /// Predict raw class label bytes for each row, preserving row order.
    fn predict(&self, rows: &[EncodedRow]) -> Result<Vec<Vec<u8>>, ModelError>;
}

/// Per-field weight tables, indexed by category position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWeights {
    pub day_of_month: Vec<f64>,
    pub day_of_week: Vec<f64>,
    pub hour_of_day: Vec<f64>,
    pub device: Vec<f64>,
}

impl FieldWeights {
    pub fn table(&self, field: FeatureField) -> &[f64] {
        match field {
            FeatureField::DayOfMonth => &self.day_of_month,
            FeatureField::DayOfWeek => &self.day_of_week,
            FeatureField::HourOfDay => &self.hour_of_day,
            FeatureField::Device => &self.device,
        }
    }
}

/// Additive one-hot logistic model: one learned weight per category value
/// per field, plus a bias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub bias: f64,
    pub weights: FieldWeights,
    /// Probability at or above which a slot is predicted activated
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

impl LogisticModel {
    /// Probability of activation for one encoded row.
    pub fn probability(&self, row: &EncodedRow) -> Result<f64, ModelError> {
        let mut logit = self.bias;
        for field in FeatureField::ALL {
            let table = self.weights.table(field);
            let index = row.index(field);
            let weight = table.get(index).ok_or(ModelError::IndexOutOfRange {
                field: field.name(),
                index,
                size: table.len(),
            })?;
            logit += weight;
        }
        Ok(1.0 / (1.0 + (-logit).exp()))
    }

    /// Check that the weight tables line up with `vocabulary`.
    pub fn check_against(&self, vocabulary: &Vocabulary) -> Result<(), ModelError> {
        if !self.bias.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(ModelError::Invalid(
                "bias must be finite and threshold within [0, 1]".to_string(),
            ));
        }
        for field in FeatureField::ALL {
            let table = self.weights.table(field);
            let expected = vocabulary.list(field).len();
            if table.len() != expected {
                return Err(ModelError::Invalid(format!(
                    "{field} has {} weights for {expected} categories",
                    table.len()
                )));
            }
            if table.iter().any(|w| !w.is_finite()) {
                return Err(ModelError::Invalid(format!("{field} has non-finite weights")));
            }
        }
        Ok(())
    }
}

impl ActivationModel for LogisticModel {
    fn predict(&self, rows: &[EncodedRow]) -> Result<Vec<Vec<u8>>, ModelError> {
        rows.iter()
            .map(|row| {
                let class = if self.probability(row)? >= self.threshold {
                    CLASS_ACTIVATED
                } else {
                    CLASS_NOT_ACTIVATED
                };
                Ok(class.to_vec())
            })
            .collect()
    }
}

/// A trained model together with the vocabulary it was built with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub vocabulary: Vocabulary,
    #[serde(flatten)]
    pub model: LogisticModel,
}

impl ModelBundle {
    /// Parse and validate a bundle from JSON.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let bundle: ModelBundle = serde_json::from_str(json)?;
        bundle.vocabulary.validate().map_err(ModelError::Invalid)?;
        bundle.model.check_against(&bundle.vocabulary)?;
        Ok(bundle)
    }

    /// Load and validate a bundle from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        let bundle = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            devices = bundle.vocabulary.device.len(),
            "Loaded model bundle"
        );
        Ok(bundle)
    }
}
