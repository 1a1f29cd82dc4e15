//! The single forward pass of a prediction request.
//!
//! ```text
//! current_time ──▶ expand_slots ──▶ encode_features ──▶ classifier ──▶ assemble
//! ```
//!
//! Each request builds its own feature table and result set. The classifier
//! is only borrowed, so one adapter can serve concurrent requests.

use crate::core::assembler::{assemble, Prediction};
use crate::core::classifier::ClassifierAdapter;
use crate::core::features::encode_features;
use crate::core::slots::{expand_slots, parse_timestamp, HORIZON_HOURS};
use crate::data::DeviceRegistry;
use crate::error::PredictError;

/// Predict activation for the next 24 hours for every device.
///
/// Output is time-major, device-minor. Any stage failing aborts the
/// request with no partial predictions.
pub fn predict_activations(
    current_time: &str,
    devices: &DeviceRegistry,
    classifier: &ClassifierAdapter,
) -> Result<Vec<Prediction>, PredictError> {
    let now = parse_timestamp(current_time)?;
    let slots = expand_slots(now, HORIZON_HOURS)?;
    if let (Some(first), Some(last)) = (slots.first(), slots.last()) {
        tracing::debug!(%first, %last, "Expanded slots");
    }

    let table = encode_features(&slots, devices)?;
    let labels = classifier.predict(&table)?;
    let predictions = assemble(table.into_keys(), &labels)?;

    tracing::debug!(
        predictions = predictions.len(),
        activated = predictions.iter().filter(|p| p.activation_predicted).count(),
        "Assembled predictions"
    );

    Ok(predictions)
}
