//! Health API
//!
//! Provides configuration and credential diagnostics for the hosts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{API_KEY_ENV_VARS, Config, redact};
use crate::error::{Error, Result};
use crate::image::ImageModel;

/// Health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
}

/// Health status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Warning,
    Error,
}

/// Overall system health report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub timestamp: String,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: Some(message.into()),
        }
    }
}

/// Run all health checks (doctor command)
pub async fn doctor() -> Result<HealthReport> {
    let path = Config::config_path().map_err(|e| Error::ConfigError(e.to_string()))?;
    Ok(doctor_at(&path, |name| std::env::var(name).ok()))
}

/// Run all health checks against an explicit config file and key lookup
pub fn doctor_at(config_path: &Path, lookup: impl Fn(&str) -> Option<String>) -> HealthReport {
    let (config_check, config) = check_config(config_path);
    let mut checks = vec![config_check];

    let config = config.unwrap_or_default();
    checks.push(check_api_key(&config, &lookup));
    checks.push(check_model(&config.restoration.model));

    let overall_status = checks
        .iter()
        .map(|c| c.status)
        .max()
        .unwrap_or(HealthStatus::Ok);

    HealthReport {
        overall_status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// Check config file
fn check_config(path: &Path) -> (HealthCheck, Option<Config>) {
    if !path.exists() {
        let check = HealthCheck::new(
            "Configuration",
            HealthStatus::Warning,
            format!("Not found at {} (using defaults)", path.display()),
        );
        return (check, None);
    }

    match Config::load_from(path) {
        Ok(config) => (
            HealthCheck::new(
                "Configuration",
                HealthStatus::Ok,
                format!("Found at {}", path.display()),
            ),
            Some(config),
        ),
        Err(e) => (
            HealthCheck::new("Configuration", HealthStatus::Error, format!("{:#}", e)),
            None,
        ),
    }
}

/// Check that an API key is present in the environment
fn check_api_key(config: &Config, lookup: &impl Fn(&str) -> Option<String>) -> HealthCheck {
    match config.restoration.resolve_api_key_with(lookup) {
        Ok(Some(key)) => HealthCheck::new(
            "API Key",
            HealthStatus::Ok,
            format!("Found in environment ({})", redact(&key)),
        ),
        Ok(None) => HealthCheck::new(
            "API Key",
            HealthStatus::Warning,
            format!("Not set. Export {}", API_KEY_ENV_VARS.join(" or ")),
        ),
        Err(e) => HealthCheck::new("API Key", HealthStatus::Error, e.to_string()),
    }
}

/// Check the configured model
fn check_model(model: &str) -> HealthCheck {
    match ImageModel::by_id(model) {
        Some(m) if m.image_to_image => {
            HealthCheck::new("Model", HealthStatus::Ok, format!("{} ({})", m.name, m.id))
        }
        Some(m) => HealthCheck::new(
            "Model",
            HealthStatus::Error,
            format!("{} cannot edit an input photo", m.id),
        ),
        None => HealthCheck::new(
            "Model",
            HealthStatus::Warning,
            format!("{} is not a known model; requests may fail", model),
        ),
    }
}

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub version: String,
    pub config_path: Option<String>,
}

/// Get system information
pub fn get_system_info() -> SystemInfo {
    SystemInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        config_path: Config::config_path().ok().map(|p| p.display().to_string()),
    }
}
