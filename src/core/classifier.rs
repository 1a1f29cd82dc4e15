//! Classifier adapter.
//!
//! The adapter is the seam between the request pipeline and whatever
//! produces labels. Both variants validate every feature value against
//! their vocabulary before predicting and return exactly one label per
//! row, in row order.

use crate::core::features::FeatureTable;
use crate::core::model::{ActivationModel, ModelBundle, CLASS_ACTIVATED, CLASS_NOT_ACTIVATED};
use crate::core::vocabulary::{EncodedRow, FeatureField, Vocabulary};
use crate::data::DeviceRegistry;
use crate::error::{ModelError, PredictError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Predicted class of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Activated,
    NotActivated,
}

impl Label {
    pub fn is_activated(self) -> bool {
        self == Label::Activated
    }

    /// Decode a raw class label produced by a trained model.
    pub fn decode(raw: &[u8]) -> Result<Label, ModelError> {
        match raw {
            CLASS_ACTIVATED => Ok(Label::Activated),
            CLASS_NOT_ACTIVATED => Ok(Label::NotActivated),
            other => Err(ModelError::UndecodableLabel(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }
}

/// Random stand-in for a trained model.
///
/// Labels carry no signal. Each label is drawn from a generator seeded by
/// the history length and the row's encoded categories, so equal-length
/// histories give equal labels and reordering rows reorders labels.
#[derive(Debug, Clone)]
pub struct BaselineClassifier {
    vocabulary: Vocabulary,
    seed: u64,
}

impl BaselineClassifier {
    pub fn new(history_len: usize, devices: &DeviceRegistry) -> Self {
        Self {
            vocabulary: Vocabulary::calendar(devices),
            seed: history_len as u64,
        }
    }

    fn label(&self, row: &EncodedRow) -> Label {
        let row_seed = FeatureField::ALL
            .iter()
            .fold(mix(self.seed), |acc, &field| mix(acc ^ row.index(field) as u64));
        let mut rng = StdRng::seed_from_u64(row_seed);
        if rng.gen_bool(0.5) {
            Label::Activated
        } else {
            Label::NotActivated
        }
    }
}

/// SplitMix64 finalizer.
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Adapter over a trained classifier capability.
#[derive(Clone)]
pub struct ModelBackedClassifier {
    vocabulary: Vocabulary,
    model: Arc<dyn ActivationModel>,
}

impl ModelBackedClassifier {
    pub fn new(vocabulary: Vocabulary, model: Arc<dyn ActivationModel>) -> Self {
        Self { vocabulary, model }
    }

    pub fn from_bundle(bundle: ModelBundle) -> Self {
        Self::new(bundle.vocabulary, Arc::new(bundle.model))
    }

    fn predict(&self, table: &FeatureTable, encoded: &[EncodedRow]) -> Result<Vec<Label>, PredictError> {
        let raw = self
            .model
            .predict(encoded)
            .map_err(|source| PredictError::Inference {
                row: None,
                features: None,
                source,
            })?;

        if raw.len() != encoded.len() {
            return Err(PredictError::Inference {
                row: None,
                features: None,
                source: ModelError::RowCount {
                    expected: encoded.len(),
                    got: raw.len(),
                },
            });
        }

        raw.iter()
            .enumerate()
            .map(|(i, bytes)| {
                Label::decode(bytes).map_err(|source| PredictError::Inference {
                    row: Some(i),
                    features: table.rows().get(i).map(|r| r.describe()),
                    source,
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for ModelBackedClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBackedClassifier")
            .field("vocabulary", &self.vocabulary)
            .finish_non_exhaustive()
    }
}

/// The two interchangeable prediction mechanisms.
#[derive(Debug, Clone)]
pub enum ClassifierAdapter {
    Baseline(BaselineClassifier),
    ModelBacked(ModelBackedClassifier),
}

impl ClassifierAdapter {
    /// Baseline adapter seeded from the number of historical readings.
    pub fn baseline(history_len: usize, devices: &DeviceRegistry) -> Self {
        ClassifierAdapter::Baseline(BaselineClassifier::new(history_len, devices))
    }

    pub fn model_backed(vocabulary: Vocabulary, model: Arc<dyn ActivationModel>) -> Self {
        ClassifierAdapter::ModelBacked(ModelBackedClassifier::new(vocabulary, model))
    }

    pub fn from_bundle(bundle: ModelBundle) -> Self {
        ClassifierAdapter::ModelBacked(ModelBackedClassifier::from_bundle(bundle))
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        match self {
            ClassifierAdapter::Baseline(b) => &b.vocabulary,
            ClassifierAdapter::ModelBacked(m) => &m.vocabulary,
        }
    }

    pub fn variant(&self) -> &'static str {
        match self {
            ClassifierAdapter::Baseline(_) => "baseline",
            ClassifierAdapter::ModelBacked(_) => "model",
        }
    }

    /// Predict one label per row of `table`, in row order.
    ///
    /// Fails with `UnknownCategory` before any inference if a value is
    /// outside the vocabulary.
    pub fn predict(&self, table: &FeatureTable) -> Result<Vec<Label>, PredictError> {
        let vocabulary = self.vocabulary();
        let encoded = table
            .rows()
            .iter()
            .map(|row| vocabulary.encode(row))
            .collect::<Result<Vec<_>, _>>()?;

        let labels: Vec<Label> = match self {
            ClassifierAdapter::Baseline(b) => encoded.iter().map(|row| b.label(row)).collect(),
            ClassifierAdapter::ModelBacked(m) => m.predict(table, &encoded)?,
        };

        tracing::debug!(variant = self.variant(), rows = table.len(), "Predicted labels");
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::encode_features;
    use crate::core::slots::next_slots;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn table(devices: &DeviceRegistry) -> FeatureTable {
        encode_features(&next_slots("2020-01-01T23:30:00").unwrap(), devices).unwrap()
    }

    /// Model that labels every row with fixed bytes and counts calls.
    struct FixedModel {
        class: &'static [u8],
        drop_last: bool,
        calls: AtomicUsize,
    }

    impl FixedModel {
        fn new(class: &'static [u8]) -> Self {
            Self {
                class,
                drop_last: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ActivationModel for FixedModel {
        fn predict(&self, rows: &[EncodedRow]) -> Result<Vec<Vec<u8>>, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let n = if self.drop_last { rows.len() - 1 } else { rows.len() };
            Ok(vec![self.class.to_vec(); n])
        }
    }

    /// Model that activates exactly the even hours.
    struct EvenHourModel;

    impl ActivationModel for EvenHourModel {
        fn predict(&self, rows: &[EncodedRow]) -> Result<Vec<Vec<u8>>, ModelError> {
            Ok(rows
                .iter()
                .map(|r| {
                    if r.hour_of_day % 2 == 0 {
                        CLASS_ACTIVATED.to_vec()
                    } else {
                        CLASS_NOT_ACTIVATED.to_vec()
                    }
                })
                .collect())
        }
    }

    #[test]
    fn test_label_decode() {
        assert_eq!(Label::decode(b"True").unwrap(), Label::Activated);
        assert_eq!(Label::decode(b"False").unwrap(), Label::NotActivated);
        assert!(matches!(
            Label::decode(b"yes"),
            Err(ModelError::UndecodableLabel(ref s)) if s == "yes"
        ));
    }

    #[test]
    fn test_baseline_is_deterministic_for_equal_history_length() {
        let devices = DeviceRegistry::numbered(2);
        let t = table(&devices);
        let first = ClassifierAdapter::baseline(120, &devices).predict(&t).unwrap();
        let second = ClassifierAdapter::baseline(120, &devices).predict(&t).unwrap();
        assert_eq!(first.len(), 48);
        assert_eq!(first, second);
    }

    #[test]
    fn test_baseline_seed_changes_labels() {
        let devices = DeviceRegistry::numbered(6);
        let t = table(&devices);
        let a = ClassifierAdapter::baseline(10, &devices).predict(&t).unwrap();
        let b = ClassifierAdapter::baseline(11, &devices).predict(&t).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_baseline_preserves_row_order_under_permutation() {
        let devices = DeviceRegistry::numbered(3);
        let t = table(&devices);
        let adapter = ClassifierAdapter::baseline(42, &devices);
        let labels = adapter.predict(&t).unwrap();

        let order: Vec<usize> = (0..t.len()).rev().collect();
        let permuted = adapter.predict(&t.select(&order)).unwrap();
        let expected: Vec<Label> = order.iter().map(|&i| labels[i]).collect();
        assert_eq!(permuted, expected);
    }

    #[test]
    fn test_model_backed_decodes_labels_in_order() {
        let devices = DeviceRegistry::numbered(2);
        let t = table(&devices);
        let adapter = ClassifierAdapter::model_backed(
            Vocabulary::calendar(&devices),
            Arc::new(EvenHourModel),
        );
        let labels = adapter.predict(&t).unwrap();
        for (row, label) in t.rows().iter().zip(&labels) {
            assert_eq!(label.is_activated(), row.hour_of_day % 2 == 0);
        }
    }

    #[test]
    fn test_unknown_device_fails_before_inference() {
        let model = Arc::new(FixedModel::new(CLASS_ACTIVATED));
        let adapter = ClassifierAdapter::model_backed(
            Vocabulary::calendar(&DeviceRegistry::numbered(6)),
            model.clone(),
        );
        let err = adapter
            .predict(&table(&DeviceRegistry::from_list(["device_1", "device_99"])))
            .unwrap_err();
        assert!(matches!(err, PredictError::UnknownCategory { field: "device", .. }));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_model_row_count_mismatch_is_inference_error() {
        let devices = DeviceRegistry::numbered(1);
        let model = FixedModel {
            drop_last: true,
            ..FixedModel::new(CLASS_ACTIVATED)
        };
        let adapter = ClassifierAdapter::model_backed(Vocabulary::calendar(&devices), Arc::new(model));
        let err = adapter.predict(&table(&devices)).unwrap_err();
        assert!(matches!(
            err,
            PredictError::Inference {
                source: ModelError::RowCount { expected: 24, got: 23 },
                ..
            }
        ));
    }

    #[test]
    fn test_undecodable_label_reports_row() {
        let devices = DeviceRegistry::numbered(1);
        let adapter = ClassifierAdapter::model_backed(
            Vocabulary::calendar(&devices),
            Arc::new(FixedModel::new(b"maybe")),
        );
        match adapter.predict(&table(&devices)).unwrap_err() {
            PredictError::Inference { row, features, .. } => {
                assert_eq!(row, Some(0));
                assert!(features.unwrap().contains("device=device_1"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
