use crate::config::Route;
use crate::error::PredictError;
use crate::model::artifact::{Predictor, Transformer};
use ndarray::ArrayView2;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A route's model plus the optional scaler applied in front of it.
#[derive(Clone)]
pub struct Pipeline {
    model: Arc<dyn Predictor>,
    scaler: Option<Arc<dyn Transformer>>,
}

impl Pipeline {
    pub fn new(model: Arc<dyn Predictor>, scaler: Option<Arc<dyn Transformer>>) -> Self {
        Self { model, scaler }
    }

    pub fn has_scaler(&self) -> bool {
        self.scaler.is_some()
    }

    /// Scales (when configured) and predicts a single row, returning the
    /// first output value. A NaN or infinite output is an error.
    pub fn predict_one(&self, row: ArrayView2<'_, f64>) -> Result<f64, PredictError> {
        let output = match &self.scaler {
            Some(scaler) => {
                let scaled = scaler.transform(row)?;
                self.model.predict(scaled.view())?
            }
            None => self.model.predict(row)?,
        };
        match output.first().copied() {
            Some(value) if value.is_finite() => Ok(value),
            Some(value) => Err(PredictError::NonFiniteOutput(value)),
            None => Err(PredictError::EmptyOutput),
        }
    }
}

/// The Registry maps each route to its pipeline.
///
/// Built once at startup and never mutated afterwards, so handlers share it
/// through a plain `Arc` without locking.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    pipelines: Arc<HashMap<Route, Pipeline>>,
}

#[derive(Default)]
pub struct RegistryBuilder {
    pipelines: HashMap<Route, Pipeline>,
}

impl RegistryBuilder {
    pub fn register(mut self, route: Route, pipeline: Pipeline) -> Self {
        self.pipelines.insert(route, pipeline);
        self
    }

    pub fn build(self) -> ModelRegistry {
        ModelRegistry {
            pipelines: Arc::new(self.pipelines),
        }
    }
}

impl ModelRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn get(&self, route: Route) -> Option<&Pipeline> {
        self.pipelines.get(&route)
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut routes: Vec<&str> = self.pipelines.keys().map(|r| r.as_str()).collect();
        routes.sort_unstable();
        f.debug_struct("ModelRegistry").field("routes", &routes).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::linear::{LinearModel, StandardScaler};
    use ndarray::array;

    #[test]
    fn test_register_and_get() {
        let registry = ModelRegistry::builder()
            .register(
                Route::AclRisk,
                Pipeline::new(Arc::new(LinearModel::new(vec![1.0], 0.0)), None),
            )
            .build();
        assert!(registry.get(Route::AclRisk).is_some());
        assert!(registry.get(Route::LoadBalance).is_none());
    }

    #[test]
    fn test_pipeline_without_scaler() {
        let pipeline = Pipeline::new(Arc::new(LinearModel::new(vec![2.0, 3.0], 1.0)), None);
        let value = pipeline.predict_one(array![[1.0, 1.0]].view()).unwrap();
        assert!((value - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_pipeline_scales_before_predicting() {
        let scaler = StandardScaler::new(vec![10.0, 0.0], vec![2.0, 1.0]);
        let pipeline = Pipeline::new(
            Arc::new(LinearModel::new(vec![1.0, 1.0], 0.0)),
            Some(Arc::new(scaler)),
        );
        // ((14 - 10) / 2) + 3
        let value = pipeline.predict_one(array![[14.0, 3.0]].view()).unwrap();
        assert!((value - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_pipeline_propagates_dimension_mismatch() {
        let pipeline = Pipeline::new(Arc::new(LinearModel::new(vec![1.0; 4], 0.0)), None);
        let err = pipeline.predict_one(array![[1.0, 2.0, 3.0]].view()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Inference);
    }

    #[test]
    fn test_registry_clones_share_pipelines() {
        let registry = ModelRegistry::builder()
            .register(
                Route::PerformanceIndex,
                Pipeline::new(Arc::new(LinearModel::new(vec![1.0; 5], 0.0)), None),
            )
            .build();
        let clone = registry.clone();
        assert!(Arc::ptr_eq(&registry.pipelines, &clone.pipelines));
        assert_eq!(format!("{clone:?}"), r#"ModelRegistry { routes: ["performance_index"] }"#);
    }
}
