//! Result assembly: zip slot keys with predicted labels.

use crate::core::classifier::Label;
use crate::core::features::SlotKey;
use crate::error::PredictError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Final prediction for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub time: NaiveDateTime,
    pub device: String,
    pub activation_predicted: bool,
}

/// Pair every key with its label, in key order.
///
/// Never drops, duplicates or reorders. Unequal lengths are a defect in
/// the caller; debug builds panic, release builds return
/// `MisalignedPredictionData`.
pub fn assemble(keys: Vec<SlotKey>, labels: &[Label]) -> Result<Vec<Prediction>, PredictError> {
    debug_assert_eq!(keys.len(), labels.len(), "slot keys and labels misaligned");
    if keys.len() != labels.len() {
        return Err(PredictError::MisalignedPredictionData {
            keys: keys.len(),
            labels: labels.len(),
        });
    }

    Ok(keys
        .into_iter()
        .zip(labels)
        .map(|(key, label)| Prediction {
            time: key.time,
            device: key.device,
            activation_predicted: label.is_activated(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::slots::parse_timestamp;

    fn key(time: &str, device: &str) -> SlotKey {
        SlotKey {
            time: parse_timestamp(time).unwrap(),
            device: device.to_string(),
        }
    }

    #[test]
    fn test_assemble_keeps_key_order() {
        let keys = vec![
            key("2020-01-02T01:00:00", "device_2"),
            key("2020-01-02T00:00:00", "device_1"),
        ];
        let predictions = assemble(keys.clone(), &[Label::NotActivated, Label::Activated]).unwrap();

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].time, keys[0].time);
        assert_eq!(predictions[0].device, "device_2");
        assert!(!predictions[0].activation_predicted);
        assert_eq!(predictions[1].device, "device_1");
        assert!(predictions[1].activation_predicted);
    }

    #[test]
    fn test_assemble_empty() {
        assert!(assemble(Vec::new(), &[]).unwrap().is_empty());
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_assemble_rejects_misaligned_input() {
        let err = assemble(vec![key("2020-01-02T00:00:00", "device_1")], &[]).unwrap_err();
        assert!(matches!(
            err,
            PredictError::MisalignedPredictionData { keys: 1, labels: 0 }
        ));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "misaligned")]
    fn test_assemble_panics_on_misaligned_input_in_debug() {
        let _ = assemble(vec![key("2020-01-02T00:00:00", "device_1")], &[]);
    }

    #[test]
    fn test_prediction_serializes_iso_time() {
        let prediction = Prediction {
            time: parse_timestamp("2020-01-02T00:00:00").unwrap(),
            device: "device_1".to_string(),
            activation_predicted: true,
        };
        let json = serde_json::to_value(&prediction).unwrap();
        assert_eq!(json["time"], "2020-01-02T00:00:00");
        assert_eq!(json["activation_predicted"], true);
    }
}
