use thiserror::Error;

// ---------------------------------------------------------------------------
// Data-layer error taxonomy
// ---------------------------------------------------------------------------

/// Errors surfaced by the data layer.
///
/// `DataUnavailable` and `InvalidColumn` abort the whole render (no dataset,
/// no charts). `ModelUnavailable` and `InferenceError` are scoped to the
/// prediction panel: the rest of the dashboard keeps rendering.
#[derive(Debug, Error)]
pub enum DataError {
    /// The dataset file is missing or malformed (missing required columns,
    /// non-parseable required fields, empty table).
    #[error("dataset unavailable: {0}")]
    DataUnavailable(String),

    /// An aggregation request named a column that does not exist, or a
    /// non-numeric column as its metric. With the dashboard's static wiring
    /// this indicates a programming error, not bad user input.
    #[error("invalid column: {0}")]
    InvalidColumn(String),

    /// The regression model artifact could not be loaded.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// The model rejected an inference record (schema mismatch). The user
    /// can adjust the form inputs and retry.
    #[error("inference failed: {0}")]
    InferenceError(String),
}
