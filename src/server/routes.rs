use crate::model::registry::ModelRegistry;
use crate::server::{docs, handlers, types::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(registry: ModelRegistry, metrics: PrometheusHandle) -> Router {
    let state = Arc::new(AppState { registry, metrics });

    // Any origin, method and header, with credentials. The permissive layer
    // mirrors the request origin since `*` cannot be sent with credentials.
    let cors = CorsLayer::very_permissive();

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route("/openapi.json", get(docs::openapi))
        .route("/docs", get(docs::swagger_ui))
        .route("/redoc", get(docs::redoc))
        .route("/predict", post(handlers::predict_performance))
        .route("/predict-ars", post(handlers::predict_ars))
        .route(
            "/predict-load-balance-score",
            post(handlers::predict_load_balance),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
