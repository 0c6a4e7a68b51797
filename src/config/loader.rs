use crate::config::schema::{DashboardConfig, EnvOverrides, DEFAULT_METRICS_PATH};
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use url::Url;
use validator::Validate;

pub const ENV_PREFIX: &str = "WPBOT";

pub struct ConfigLoader;

impl ConfigLoader {
    /// File (or defaults) + environment overrides, validated.
    pub fn load(path: Option<&Path>) -> Result<DashboardConfig> {
        let config = match path {
            Some(path) => Self::load_file(path)?,
            None => DashboardConfig::default(),
        };
        let config = Self::apply_overrides(config, Self::env_overrides()?);
        config.validate()?;
        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<DashboardConfig> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
            Some("toml") => Ok(toml::from_str(&content)?),
            _ => Err(Error::Config(format!(
                "Unsupported file extension: {}",
                path.display()
            ))),
        }
    }

    /// Reads `WPBOT_BASE_URL` and `WPBOT_METRICS_URL` once.
    pub fn env_overrides() -> Result<EnvOverrides> {
        let settings = ::config::Config::builder()
            .add_source(::config::Environment::with_prefix(ENV_PREFIX))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn apply_overrides(mut config: DashboardConfig, env: EnvOverrides) -> DashboardConfig {
        if let Some(base_url) = env.base_url.filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url;
        }
        if let Some(metrics_url) = env.metrics_url.filter(|v| !v.trim().is_empty()) {
            config.metrics_url = Some(metrics_url);
        }
        config
    }

    /// Absolute `metrics_url` wins; a relative one (or the default path) is
    /// joined onto `base_url`.
    pub fn metrics_endpoint(config: &DashboardConfig) -> Result<Url> {
        let target = config.metrics_url.as_deref().unwrap_or(DEFAULT_METRICS_PATH);

        let url = match Url::parse(target) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse(&config.base_url)?.join(target)?
            }
            Err(e) => return Err(e.into()),
        };

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(Error::Config(format!(
                "Unsupported metrics URL scheme: {}",
                other
            ))),
        }
    }
}
