use crate::error::PredictError;
use ndarray::{Array1, Array2, ArrayView2};

/// A trained model with a single prediction operation.
///
/// Input is a `(rows, features)` matrix; output holds one scalar per row.
pub trait Predictor: Send + Sync {
    /// Feature count the artifact was fitted on, when the format records it.
    fn n_features(&self) -> Option<usize>;

    fn predict(&self, input: ArrayView2<'_, f64>) -> Result<Array1<f64>, PredictError>;
}

/// A pre-fitted feature transform applied before prediction.
pub trait Transformer: Send + Sync {
    fn n_features(&self) -> Option<usize>;

    /// Returns a matrix of the same shape as `input`.
    fn transform(&self, input: ArrayView2<'_, f64>) -> Result<Array2<f64>, PredictError>;
}

/// Rejects `input` unless it has exactly `expected` columns.
pub(crate) fn check_columns(input: &ArrayView2<'_, f64>, expected: usize) -> Result<(), PredictError> {
    if input.ncols() != expected {
        return Err(PredictError::ShapeMismatch {
            expected: vec![input.nrows(), expected],
            got: input.shape().to_vec(),
        });
    }
    Ok(())
}
