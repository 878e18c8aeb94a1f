//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::image::{DEFAULT_MODEL_ID, GEMINI_BASE_URL, Strength};
use crate::restoration::Locale;

/// Environment variables consulted for the API key, in order
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Revive configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub restoration: RestorationConfig,
    pub ui: UiConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestorationConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub default_strength: u8,
    pub timeout_secs: u64,
    pub download_file_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub locale: Locale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub max_upload_bytes: u64,
}

impl Default for RestorationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL_ID.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            default_strength: Strength::default().value(),
            timeout_secs: 120,
            download_file_name: "restored_image.png".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8787".to_string(),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl RestorationConfig {
    pub fn resolved_api_key(&self) -> anyhow::Result<Option<String>> {
        self.resolve_api_key_with(|name| env::var(name).ok())
    }

    /// Resolve the API key through `lookup`, skipping blank values
    pub fn resolve_api_key_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;

        Ok(API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty()))
    }

    pub fn redacted_api_key(&self) -> anyhow::Result<Option<String>> {
        self.resolved_api_key().map(|opt| opt.map(|key| redact(&key)))
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.api_key.is_some() {
            return Err(anyhow!(
                "API keys must be provided via environment variables, not stored in configuration"
            ));
        }
        Ok(())
    }

    pub fn strength(&self) -> Strength {
        Strength::new(i64::from(self.default_strength))
    }
}

/// Show only the last four characters of a secret
pub fn redact(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        "***".to_string()
    } else {
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("***{}", suffix)
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        self.bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.bind_address))
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("REVIVE_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("revive")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or return defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.restoration.enforce_env_only()?;

        if self.restoration.default_strength > Strength::MAX {
            return Err(anyhow!(
                "Default strength must be between {} and {}",
                Strength::MIN,
                Strength::MAX
            ));
        }
        if self.restoration.timeout_secs == 0 {
            return Err(anyhow!("Timeout must be at least one second"));
        }
        validate_file_name(&self.restoration.download_file_name)?;
        self.server.socket_addr()?;

        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "restoration.model" => Ok(self.restoration.model.clone()),
            "restoration.base_url" => Ok(self.restoration.base_url.clone()),
            "restoration.default_strength" => Ok(self.restoration.default_strength.to_string()),
            "restoration.timeout_secs" => Ok(self.restoration.timeout_secs.to_string()),
            "restoration.download_file_name" => Ok(self.restoration.download_file_name.clone()),

            "ui.locale" => Ok(self.ui.locale.to_string()),

            "server.bind_address" => Ok(self.server.bind_address.clone()),
            "server.max_upload_bytes" => Ok(self.server.max_upload_bytes.to_string()),

            // API key (special handling - show redacted)
            "restoration.api_key" | "api_key" => match self.restoration.redacted_api_key()? {
                Some(redacted) => Ok(redacted),
                None => Ok("(not set - use GEMINI_API_KEY or API_KEY env var)".to_string()),
            },

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `revive config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "restoration.model" => {
                if value.trim().is_empty() {
                    return Err(anyhow!("Model id must not be empty"));
                }
                self.restoration.model = value.trim().to_string();
            }
            "restoration.base_url" => {
                if !(value.starts_with("https://") || value.starts_with("http://")) {
                    return Err(anyhow!("Base URL must start with http:// or https://"));
                }
                self.restoration.base_url = value.trim_end_matches('/').to_string();
            }
            "restoration.default_strength" => {
                let strength: u8 = value
                    .parse()
                    .with_context(|| format!("Invalid default_strength value: {}", value))?;
                if strength > Strength::MAX {
                    return Err(anyhow!(
                        "Default strength must be between {} and {}",
                        Strength::MIN,
                        Strength::MAX
                    ));
                }
                self.restoration.default_strength = strength;
            }
            "restoration.timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
                if secs == 0 {
                    return Err(anyhow!("Timeout must be at least one second"));
                }
                self.restoration.timeout_secs = secs;
            }
            "restoration.download_file_name" => {
                validate_file_name(value)?;
                self.restoration.download_file_name = value.to_string();
            }

            "ui.locale" => {
                self.ui.locale = Locale::parse(value).ok_or_else(|| {
                    anyhow!("Invalid locale: {}. Valid options: vi, en", value)
                })?;
            }

            "server.bind_address" => {
                value
                    .parse::<SocketAddr>()
                    .with_context(|| format!("Invalid bind address: {}", value))?;
                self.server.bind_address = value.to_string();
            }
            "server.max_upload_bytes" => {
                let limit: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid max_upload_bytes value: {}", value))?;
                if limit == 0 {
                    return Err(anyhow!("Upload limit must be positive"));
                }
                self.server.max_upload_bytes = limit;
            }

            // API key cannot be set via config
            "restoration.api_key" | "api_key" => {
                return Err(anyhow!(
                    "API keys cannot be stored in configuration for security. \
                     Set the GEMINI_API_KEY or API_KEY environment variable instead."
                ));
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `revive config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "restoration.model",
            "restoration.base_url",
            "restoration.default_strength",
            "restoration.timeout_secs",
            "restoration.download_file_name",
            "restoration.api_key",
            "ui.locale",
            "server.bind_address",
            "server.max_upload_bytes",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

fn validate_file_name(name: &str) -> anyhow::Result<()> {
    if name.trim().is_empty() || name.contains('/') || name.contains('\\') {
        return Err(anyhow!(
            "Download file name must be a plain file name without directories: {:?}",
            name
        ));
    }
    Ok(())
}
