use crate::html::is_dom_id;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DashboardConfig {
    /// Root of the backend API, e.g. `http://127.0.0.1:5000`.
    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,

    /// Absolute URL, or a path resolved against `base_url`.
    #[serde(default)]
    #[validate(length(min = 1))]
    pub metrics_url: Option<String>,

    /// Id of the element the panel renders into.
    #[serde(default = "default_container_id")]
    #[validate(custom = "validate_container_id")]
    pub container_id: String,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputConfig {
    #[default]
    Console,
    File {
        path: String,
    },
}

/// Values picked up from `WPBOT_*` environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvOverrides {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub metrics_url: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            metrics_url: None,
            container_id: default_container_id(),
            output: OutputConfig::default(),
        }
    }
}

pub const DEFAULT_METRICS_PATH: &str = "/metrics";

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_container_id() -> String {
    "live-metrics".to_string()
}

fn validate_container_id(id: &str) -> Result<(), ValidationError> {
    if is_dom_id(id) {
        Ok(())
    } else {
        Err(ValidationError::new("container_id"))
    }
}
