use crate::error::PredictError;
use crate::model::artifact::{check_columns, Predictor, Transformer};
use ndarray::{Array1, Array2, ArrayView2};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{Tensor, ValueType};
use std::path::Path;
use std::sync::Mutex;

/// Initializes the global ONNX Runtime environment. Only needed once.
pub fn init_ort() -> Result<(), PredictError> {
    ort::init().with_name("perfserve").commit()?;
    Ok(())
}

/// An ONNX graph taking one float32 `(rows, features)` input.
///
/// Usable as a regressor (first output flattened to one value per row) or
/// as a scaler (first output kept as a matrix).
pub struct OnnxModel {
    // `Session::run` needs exclusive access.
    session: Mutex<Session>,
    input_name: String,
    n_features: Option<usize>,
}

impl OnnxModel {
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, PredictError> {
        let path = model_path.as_ref();
        if !path.exists() {
            return Err(PredictError::ModelNotFound(path.display().to_string()));
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(1)?
            .commit_from_file(path)?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| PredictError::UnsupportedFormat(format!("{} has no inputs", path.display())))?;
        let input_name = input.name.clone();
        let n_features = match &input.input_type {
            ValueType::Tensor { shape, .. } => shape
                .get(1)
                .and_then(|&dim| usize::try_from(dim).ok()),
            _ => None,
        };

        for (i, input) in session.inputs.iter().enumerate() {
            tracing::debug!("  input {}: {} ({:?})", i, input.name, input.input_type);
        }

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            n_features,
        })
    }

    /// Runs the graph and returns the first output as `(shape, values)`.
    fn run(&self, input: ArrayView2<'_, f64>) -> Result<(Vec<usize>, Vec<f64>), PredictError> {
        if let Some(expected) = self.n_features {
            check_columns(&input, expected)?;
        }

        let shape = input.shape().to_vec();
        let data: Box<[f32]> = input.iter().map(|&v| v as f32).collect();
        let input_value = Tensor::from_array((shape, data))?;

        let mut session_guard = self
            .session
            .lock()
            .map_err(|_| PredictError::SessionPoisoned)?;
        let outputs = session_guard.run(ort::inputs![self.input_name.as_str() => input_value])?;

        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
        let values = data.iter().map(|&v| f64::from(v)).collect();
        Ok((dims, values))
    }
}

impl Predictor for OnnxModel {
    fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    fn predict(&self, input: ArrayView2<'_, f64>) -> Result<Array1<f64>, PredictError> {
        let (_, values) = self.run(input)?;
        Ok(Array1::from(values))
    }
}

impl Transformer for OnnxModel {
    fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    fn transform(&self, input: ArrayView2<'_, f64>) -> Result<Array2<f64>, PredictError> {
        let rows = input.nrows();
        let cols = input.ncols();
        let (dims, values) = self.run(input)?;
        if dims != [rows, cols] {
            return Err(PredictError::ShapeMismatch {
                expected: vec![rows, cols],
                got: dims,
            });
        }
        Ok(Array2::from_shape_vec((rows, cols), values)?)
    }
}
