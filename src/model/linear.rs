//! JSON-serialized linear artifacts: ordinary least squares regressors and
//! standardization scalers exported from a training notebook.

use crate::error::PredictError;
use crate::model::artifact::{check_columns, Predictor, Transformer};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Top-level shape of a `.json` artifact file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JsonArtifact {
    Linear(LinearModel),
    StandardScaler(StandardScaler),
}

/// `y = x · coefficients + intercept`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }
}

impl Predictor for LinearModel {
    fn n_features(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn predict(&self, input: ArrayView2<'_, f64>) -> Result<Array1<f64>, PredictError> {
        check_columns(&input, self.coefficients.len())?;
        let weights = Array1::from(self.coefficients.clone());
        Ok(input.dot(&weights) + self.intercept)
    }
}

/// `z = (x - mean) / scale`, column-wise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { mean, scale }
    }

    /// Mean and scale must describe the same columns.
    pub fn is_consistent(&self) -> bool {
        self.mean.len() == self.scale.len()
    }
}

impl Transformer for StandardScaler {
    fn n_features(&self) -> Option<usize> {
        Some(self.mean.len())
    }

    fn transform(&self, input: ArrayView2<'_, f64>) -> Result<Array2<f64>, PredictError> {
        if !self.is_consistent() {
            return Err(PredictError::ShapeMismatch {
                expected: vec![self.mean.len()],
                got: vec![self.scale.len()],
            });
        }
        check_columns(&input, self.mean.len())?;

        // Constant training columns are stored with scale 0; leave them unscaled.
        let scale: Array1<f64> = self
            .scale
            .iter()
            .map(|&s| if s == 0.0 { 1.0 } else { s })
            .collect();
        let mean = Array1::from(self.mean.clone());

        let centered = &input - &mean.insert_axis(Axis(0));
        Ok(centered / &scale.insert_axis(Axis(0)))
    }
}
