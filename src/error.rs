//! Error types for the prediction pipeline and its batch collaborators.

use thiserror::Error;

/// Failures of a single prediction request.
///
/// None of these are retried; any stage failing aborts the rest of the
/// request.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The request's current time could not be parsed.
    #[error("invalid timestamp '{input}': {reason}")]
    InvalidTimestamp { input: String, reason: String },

    /// The request body could not be read as a prediction request.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// No devices to predict for.
    #[error("device registry is empty")]
    EmptyDeviceRegistry,

    /// A feature value is outside the vocabulary the model was built with.
    #[error("unknown {field} category '{value}'")]
    UnknownCategory { field: &'static str, value: String },

    /// The trained classifier failed.
    #[error("inference failed{}: {source}", describe_row(.row, .features))]
    Inference {
        row: Option<usize>,
        features: Option<String>,
        #[source]
        source: ModelError,
    },

    /// Keys and labels differ in length. Always a programming defect.
    #[error("misaligned prediction data: {keys} keys, {labels} labels")]
    MisalignedPredictionData { keys: usize, labels: usize },
}

impl PredictError {
    /// Stable name of the error kind, used in structured error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::InvalidTimestamp { .. } => "InvalidTimestamp",
            PredictError::InvalidRequest { .. } => "InvalidRequest",
            PredictError::EmptyDeviceRegistry => "EmptyDeviceRegistry",
            PredictError::UnknownCategory { .. } => "UnknownCategory",
            PredictError::Inference { .. } => "InferenceError",
            PredictError::MisalignedPredictionData { .. } => "MisalignedPredictionData",
        }
    }

    /// Whether the failure was caused by the request's input rather than
    /// the model or the pipeline itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PredictError::InvalidTimestamp { .. }
                | PredictError::InvalidRequest { .. }
                | PredictError::EmptyDeviceRegistry
                | PredictError::UnknownCategory { .. }
        )
    }
}

fn describe_row(row: &Option<usize>, features: &Option<String>) -> String {
    match (row, features) {
        (Some(row), Some(features)) => format!(" at row {row} ({features})"),
        (Some(row), None) => format!(" at row {row}"),
        (None, _) => String::new(),
    }
}

/// Failures of the trained classifier capability.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model returned {got} labels for {expected} rows")]
    RowCount { expected: usize, got: usize },

    #[error("undecodable class label {0:?}")]
    UndecodableLabel(String),

    #[error("{field} index {index} out of range for model of size {size}")]
    IndexOutOfRange {
        field: &'static str,
        index: usize,
        size: usize,
    },

    #[error("invalid model: {0}")]
    Invalid(String),

    #[error("failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures of the batch CSV collaborators.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid reading at line {line}: {reason}")]
    InvalidReading { line: u64, reason: String },

    #[error("readings span {hours} hours, more than the {max} hours that can be resampled")]
    SpanTooLarge { hours: i64, max: i64 },
}
