use crate::error::PredictError;
use ndarray::Array2;

/// One named input column and its inclusive bounds, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub bounds: Option<(f64, f64)>,
}

impl FieldSpec {
    pub const fn unbounded(name: &'static str) -> Self {
        Self { name, bounds: None }
    }

    pub const fn bounded(name: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            bounds: Some((min, max)),
        }
    }

    pub fn check(&self, value: f64) -> Result<(), PredictError> {
        if !value.is_finite() {
            return Err(PredictError::validation(self.name, "must be a finite number"));
        }
        if let Some((min, max)) = self.bounds {
            if value < min || value > max {
                return Err(PredictError::validation(
                    self.name,
                    format!("must be between {min} and {max} inclusive, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// A typed request body that maps onto a model's feature columns.
///
/// `FIELDS` fixes the column order; `values` must yield the request's
/// numbers in that same order.
pub trait FeatureRow {
    const FIELDS: &'static [FieldSpec];

    fn values(&self) -> Vec<f64>;
}

/// Validates a request and lays it out as a `(1, F)` feature matrix.
pub fn feature_row<R: FeatureRow>(request: &R) -> Result<Array2<f64>, PredictError> {
    let values = request.values();
    if values.len() != R::FIELDS.len() {
        return Err(PredictError::ShapeMismatch {
            expected: vec![1, R::FIELDS.len()],
            got: vec![1, values.len()],
        });
    }

    for (spec, &value) in R::FIELDS.iter().zip(&values) {
        spec.check(value)?;
    }

    Ok(Array2::from_shape_vec((1, values.len()), values)?)
}

/// Rounds to `decimals` places on the value's exact decimal expansion, with
/// exact ties going to the even digit. Never overflows: huge values come
/// back unchanged.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}
