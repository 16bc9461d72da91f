use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

const ENV_PORTAL_CONFIG_PATH: &str = "PORTAL_CONFIG_PATH";
const DEFAULT_PORTAL_CONFIG_PATH: &str = "config/portal.yaml";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("Invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Organization branding printed at the top of every report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrganizationInfo {
    pub name: String,
    pub address: String,
    pub id: String,
}

impl Default for OrganizationInfo {
    fn default() -> Self {
        Self {
            name: "Sumit HealthCare Services".to_string(),
            address: "456 Wellness Ave, MedCity, Australia | +61-987-654-321".to_string(),
            id: "HealthCare-001".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    /// Delay before chart images and downloaded reports are removed.
    pub grace_secs: u64,
    /// Upper bound on how long an undownloaded report stays on disk.
    pub report_retention_secs: u64,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            grace_secs: 10,
            report_retention_secs: 600,
        }
    }
}

impl CleanupSettings {
    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }

    pub fn report_retention(&self) -> Duration {
        Duration::from_secs(self.report_retention_secs)
    }
}

/// YAML portal file structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub organization: OrganizationInfo,
    #[serde(default)]
    pub cleanup: CleanupSettings,
}

impl PortalConfig {
    /// A missing file yields defaults; an unreadable or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("Portal config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Url,
    /// Upper bound on one completion request.
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub models_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub charts_dir: PathBuf,
    pub gemini: GeminiConfig,
    pub portal: PortalConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: "PORT",
                value: raw,
            })?,
            None => 8081,
        };

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::MissingVar("JWT_SECRET"))?;

        let base_url_raw =
            var("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());
        let base_url = Url::parse(&base_url_raw).map_err(|_| ConfigError::InvalidVar {
            name: "GEMINI_BASE_URL",
            value: base_url_raw.clone(),
        })?;

        let timeout_secs = match var("GEMINI_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidVar {
                        name: "GEMINI_TIMEOUT_SECS",
                        value: raw,
                    });
                }
            },
            None => DEFAULT_GEMINI_TIMEOUT_SECS,
        };

        let portal_path = PathBuf::from(
            var(ENV_PORTAL_CONFIG_PATH).unwrap_or_else(|| DEFAULT_PORTAL_CONFIG_PATH.to_string()),
        );

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            jwt_secret,
            models_dir: var("MODELS_DIR").unwrap_or_else(|| "models".into()).into(),
            reports_dir: var("REPORTS_DIR").unwrap_or_else(|| "reports".into()).into(),
            charts_dir: var("CHARTS_DIR")
                .unwrap_or_else(|| "reports/charts".into())
                .into(),
            gemini: GeminiConfig {
                api_key: var("GEMINI_API_KEY"),
                model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            portal: PortalConfig::load(&portal_path)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
