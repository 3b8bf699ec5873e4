use crate::config::{ModelConfig, Route};
use crate::error::PredictError;
use crate::model::artifact::{Predictor, Transformer};
use crate::model::linear::JsonArtifact;
use crate::model::onnx::OnnxModel;
use crate::model::registry::{ModelRegistry, Pipeline};
use crate::server::types::schema;
use std::fs;
use std::path::Path;
use std::sync::Arc;

enum Format {
    Json,
    Onnx,
}

fn format_of(path: &Path) -> Result<Format, PredictError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
        Some(ext) if ext.eq_ignore_ascii_case("onnx") => Ok(Format::Onnx),
        _ => Err(PredictError::UnsupportedFormat(path.display().to_string())),
    }
}

fn read_json_artifact(path: &Path) -> Result<JsonArtifact, PredictError> {
    if !path.exists() {
        return Err(PredictError::ModelNotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path).map_err(|source| PredictError::ArtifactRead {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| PredictError::ArtifactParse {
        path: path.display().to_string(),
        source,
    })
}

/// Loads a model artifact from disk, choosing the format by extension.
///
/// # Arguments
/// * `model_path` - Path to a `.json` linear artifact or an `.onnx` graph
pub fn load_predictor(model_path: impl AsRef<Path>) -> Result<Arc<dyn Predictor>, PredictError> {
    let path = model_path.as_ref();
    let model: Arc<dyn Predictor> = match format_of(path)? {
        Format::Json => match read_json_artifact(path)? {
            JsonArtifact::Linear(model) => Arc::new(model),
            JsonArtifact::StandardScaler(_) => {
                return Err(PredictError::WrongArtifactKind {
                    path: path.display().to_string(),
                    expected: "model",
                })
            }
        },
        Format::Onnx => Arc::new(OnnxModel::load(path)?),
    };

    tracing::info!(
        "Loaded model: {} ({} features)",
        path.display(),
        describe(model.n_features())
    );
    Ok(model)
}

/// Loads a scaler artifact from disk, choosing the format by extension.
pub fn load_transformer(
    scaler_path: impl AsRef<Path>,
) -> Result<Arc<dyn Transformer>, PredictError> {
    let path = scaler_path.as_ref();
    let scaler: Arc<dyn Transformer> = match format_of(path)? {
        Format::Json => match read_json_artifact(path)? {
            JsonArtifact::StandardScaler(scaler) if scaler.is_consistent() => Arc::new(scaler),
            JsonArtifact::StandardScaler(_) => {
                return Err(PredictError::UnsupportedFormat(format!(
                    "{}: mean and scale lengths differ",
                    path.display()
                )))
            }
            JsonArtifact::Linear(_) => {
                return Err(PredictError::WrongArtifactKind {
                    path: path.display().to_string(),
                    expected: "scaler",
                })
            }
        },
        Format::Onnx => Arc::new(OnnxModel::load(path)?),
    };

    tracing::info!(
        "Loaded scaler: {} ({} features)",
        path.display(),
        describe(scaler.n_features())
    );
    Ok(scaler)
}

fn describe(n_features: Option<usize>) -> String {
    n_features.map_or_else(|| "dynamic".to_string(), |n| n.to_string())
}

/// Logs a warning when an artifact's recorded width disagrees with the
/// route's schema. The request path reports the mismatch as an error.
fn warn_on_width(route: Route, what: &str, n_features: Option<usize>) {
    let expected = schema(route).len();
    if let Some(actual) = n_features {
        if actual != expected {
            tracing::warn!(
                route = route.as_str(),
                "{} expects {} features but the route builds {}",
                what,
                actual,
                expected
            );
        }
    }
}

/// Loads every configured pipeline and freezes them into a registry.
///
/// Every route must end up with a pipeline, and routes fitted on scaled
/// features must have a scaler.
pub fn load_registry(models: &[ModelConfig]) -> Result<ModelRegistry, PredictError> {
    let mut builder = ModelRegistry::builder();

    for model_conf in models {
        tracing::info!("Loading pipeline for route {}", model_conf.route);

        let model = load_predictor(&model_conf.path)?;
        warn_on_width(model_conf.route, "model", model.n_features());

        let scaler = match &model_conf.scaler {
            Some(scaler_path) => {
                let scaler = load_transformer(scaler_path)?;
                warn_on_width(model_conf.route, "scaler", scaler.n_features());
                Some(scaler)
            }
            None if model_conf.route.requires_scaler() => {
                return Err(PredictError::ScalerMissing(model_conf.route))
            }
            None => None,
        };

        builder = builder.register(model_conf.route, Pipeline::new(model, scaler));
    }

    let registry = builder.build();
    if let Some(route) = Route::ALL.into_iter().find(|r| registry.get(*r).is_none()) {
        return Err(PredictError::PipelineMissing(route));
    }
    Ok(registry)
}
