use crate::config::Route;
use crate::model::registry::ModelRegistry;
use crate::preprocessing::tabular::{FeatureRow, FieldSpec};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};

/// Shared Application State
#[derive(Clone)]
pub struct AppState {
    pub registry: ModelRegistry,
    pub metrics: PrometheusHandle,
}

/// Field schema backing each route, in feature-column order.
pub fn schema(route: Route) -> &'static [FieldSpec] {
    match route {
        Route::PerformanceIndex => PerformanceRequest::FIELDS,
        Route::AclRisk => AclRiskRequest::FIELDS,
        Route::LoadBalance => LoadBalanceRequest::FIELDS,
    }
}

// --- DTOs (Data Transfer Objects) ---

// Student performance
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PerformanceRequest {
    pub hours_studied: f64,
    pub previous_scores: f64,
    pub extracurricular_activities: f64,
    pub sleep_hours: f64,
    pub sample_question_papers_practiced: f64,
}

// Column order as documented for the performance model; it has never been
// cross-checked against the training notebook, so do not reorder.
impl FeatureRow for PerformanceRequest {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::unbounded("hours_studied"),
        FieldSpec::unbounded("previous_scores"),
        FieldSpec::unbounded("extracurricular_activities"),
        FieldSpec::unbounded("sleep_hours"),
        FieldSpec::unbounded("sample_question_papers_practiced"),
    ];

    fn values(&self) -> Vec<f64> {
        vec![
            self.hours_studied,
            self.previous_scores,
            self.extracurricular_activities,
            self.sleep_hours,
            self.sample_question_papers_practiced,
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct PerformanceResponse {
    #[serde(rename = "Performance Index")]
    pub performance_index: f64,
}

// ACL risk
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AclRiskRequest {
    pub fatigue_score: f64,
}

impl FeatureRow for AclRiskRequest {
    const FIELDS: &'static [FieldSpec] = &[FieldSpec::bounded("fatigue_score", 0.0, 10.0)];

    fn values(&self) -> Vec<f64> {
        vec![self.fatigue_score]
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct AclRiskResponse {
    #[serde(rename = "ACL Risk Score")]
    pub acl_risk_score: f64,
}

// Training load balance
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoadBalanceRequest {
    pub training_hours_per_week: f64,
    pub recovery_days_per_week: f64,
    pub acl_risk_score: f64,
}

impl FeatureRow for LoadBalanceRequest {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::bounded("training_hours_per_week", 0.0, 40.0),
        FieldSpec::bounded("recovery_days_per_week", 0.0, 7.0),
        FieldSpec::bounded("acl_risk_score", 0.0, 100.0),
    ];

    fn values(&self) -> Vec<f64> {
        vec![
            self.training_hours_per_week,
            self.recovery_days_per_week,
            self.acl_risk_score,
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct LoadBalanceResponse {
    #[serde(rename = "Load Balance Score")]
    pub load_balance_score: f64,
}

// Root
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct RootResponse {
    pub message: String,
    pub docs_url: String,
    pub redoc_url: String,
}
