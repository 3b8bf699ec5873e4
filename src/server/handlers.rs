use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Route;
use crate::error::PredictError;
use crate::observability;
use crate::preprocessing::tabular::{feature_row, round_to, FeatureRow};
use crate::server::types::*;

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to the Student Performance Prediction API!".to_string(),
        docs_url: "/docs".to_string(),
        redoc_url: "/redoc".to_string(),
    })
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics.render()
}

/// Validates the request, builds its feature row and runs the route's
/// pipeline. Validation happens before the pipeline is even looked up.
fn dispatch<R: FeatureRow>(state: &AppState, route: Route, request: &R) -> Result<f64, PredictError> {
    let row = feature_row(request)?;
    let pipeline = state
        .registry
        .get(route)
        .ok_or(PredictError::PipelineMissing(route))?;

    let start = Instant::now();
    let value = pipeline.predict_one(row.view())?;
    observability::record_prediction(route, start.elapsed().as_secs_f64());

    Ok(value)
}

/// Unwraps the JSON body and runs `dispatch`, logging and counting failures.
fn handle<R: FeatureRow>(
    state: &AppState,
    route: Route,
    payload: Result<Json<R>, JsonRejection>,
) -> Result<f64, PredictError> {
    let result = payload
        .map_err(PredictError::from)
        .and_then(|Json(request)| dispatch(state, route, &request));

    if let Err(err) = &result {
        observability::record_failure(route, err.kind());
        match err.kind() {
            crate::error::ErrorKind::Validation => {
                tracing::debug!(route = route.as_str(), "rejected request: {}", err)
            }
            _ => tracing::error!(route = route.as_str(), "prediction failed: {}", err),
        }
    }
    result
}

pub async fn predict_performance(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PerformanceRequest>, JsonRejection>,
) -> Result<Json<PerformanceResponse>, PredictError> {
    let value = handle(&state, Route::PerformanceIndex, payload)?;
    Ok(Json(PerformanceResponse {
        performance_index: round_to(value, 2),
    }))
}

pub async fn predict_ars(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AclRiskRequest>, JsonRejection>,
) -> Result<Json<AclRiskResponse>, PredictError> {
    let value = handle(&state, Route::AclRisk, payload)?;
    Ok(Json(AclRiskResponse {
        acl_risk_score: value,
    }))
}

pub async fn predict_load_balance(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoadBalanceRequest>, JsonRejection>,
) -> Result<Json<LoadBalanceResponse>, PredictError> {
    let value = handle(&state, Route::LoadBalance, payload)?;
    Ok(Json(LoadBalanceResponse {
        load_balance_score: value,
    }))
}
