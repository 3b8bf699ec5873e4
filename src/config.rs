use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable naming the YAML config file.
pub const CONFIG_ENV: &str = "PERFSERVE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_models")]
    pub models: Vec<ModelConfig>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ModelConfig {
    pub route: Route,
    pub path: String,
    #[serde(default)]
    pub scaler: Option<String>,
}

/// One prediction endpoint and the pipeline behind it.
#[derive(Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    PerformanceIndex,
    AclRisk,
    LoadBalance,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::PerformanceIndex, Route::AclRisk, Route::LoadBalance];

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::PerformanceIndex => "performance_index",
            Route::AclRisk => "acl_risk",
            Route::LoadBalance => "load_balance",
        }
    }

    pub fn http_path(&self) -> &'static str {
        match self {
            Route::PerformanceIndex => "/predict",
            Route::AclRisk => "/predict-ars",
            Route::LoadBalance => "/predict-load-balance-score",
        }
    }

    /// The load-balance model was fitted on standardized features.
    pub fn requires_scaler(&self) -> bool {
        matches!(self, Route::LoadBalance)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_models() -> Vec<ModelConfig> {
    vec![
        ModelConfig {
            route: Route::PerformanceIndex,
            path: "models/performance.json".to_string(),
            scaler: None,
        },
        ModelConfig {
            route: Route::AclRisk,
            path: "models/ars.json".to_string(),
            scaler: None,
        },
        ModelConfig {
            route: Route::LoadBalance,
            path: "models/load_balance.json".to_string(),
            scaler: Some("models/load_balance_scaler.json".to_string()),
        },
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            models: default_models(),
        }
    }
}

impl AppConfig {
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content).context("invalid config YAML")
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Resolves the config the way the binary does: an explicit
    /// `PERFSERVE_CONFIG` must exist, while a missing default `config.yaml`
    /// falls back to the built-in artifact filenames.
    pub fn resolve(explicit: Option<String>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)
            }
            None => {
                tracing::info!(
                    "{} not found, using built-in artifact paths",
                    DEFAULT_CONFIG_PATH
                );
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
server:
  host: 127.0.0.1
  port: 9000
models:
  - route: performance_index
    path: models/student.onnx
  - route: load_balance
    path: models/lb.json
    scaler: models/lb_scaler.json
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[0].route, Route::PerformanceIndex);
        assert!(config.models[0].scaler.is_none());
        assert_eq!(
            config.models[1].scaler.as_deref(),
            Some("models/lb_scaler.json")
        );
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = AppConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.models.len(), 3);
        let lb = config
            .models
            .iter()
            .find(|m| m.route == Route::LoadBalance)
            .unwrap();
        assert!(lb.scaler.is_some());
    }

    #[test]
    fn test_unknown_route_rejected() {
        let yaml = "models:\n  - route: image_classification\n    path: x.onnx\n";
        assert!(AppConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  host: localhost\n  port: 3000").unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = AppConfig::resolve(Some("definitely/not/here.yaml".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::PerformanceIndex.http_path(), "/predict");
        assert_eq!(Route::AclRisk.http_path(), "/predict-ars");
        assert_eq!(
            Route::LoadBalance.http_path(),
            "/predict-load-balance-score"
        );
        assert!(Route::LoadBalance.requires_scaler());
        assert!(!Route::AclRisk.requires_scaler());
    }
}
