use crate::config::Route;
use crate::error::ErrorKind;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global `tracing` subscriber, filtered by `RUST_LOG`
/// (default `info`). Calling it twice is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Installs the global Prometheus recorder and returns the handle `/metrics`
/// renders from.
pub fn install_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

pub fn record_prediction(route: Route, seconds: f64) {
    counter!("predictions_total", "route" => route.as_str()).increment(1);
    histogram!("prediction_duration_seconds", "route" => route.as_str()).record(seconds);
}

pub fn record_failure(route: Route, kind: ErrorKind) {
    match kind {
        ErrorKind::Validation => {
            counter!("prediction_rejections_total", "route" => route.as_str()).increment(1)
        }
        ErrorKind::Inference | ErrorKind::Startup => {
            counter!("prediction_failures_total", "route" => route.as_str()).increment(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_metrics_rendered() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_prediction(Route::AclRisk, 0.002);
            record_prediction(Route::AclRisk, 0.003);
        });

        let output = handle.render();
        assert!(output.contains("predictions_total"));
        assert!(output.contains(r#"route="acl_risk""#));
        assert!(output.contains("prediction_duration_seconds"));
    }

    #[test]
    fn test_failure_metrics_split_by_kind() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_failure(Route::LoadBalance, ErrorKind::Validation);
            record_failure(Route::PerformanceIndex, ErrorKind::Inference);
        });

        let output = handle.render();
        assert!(output.contains(r#"prediction_rejections_total{route="load_balance"} 1"#));
        assert!(output.contains(r#"prediction_failures_total{route="performance_index"} 1"#));
    }

    #[test]
    fn test_tracing_setup_is_idempotent() {
        init_tracing();
        init_tracing();
        tracing::info!("Tracing initialized for test");
    }
}
