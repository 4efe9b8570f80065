//! Client configuration
//!
//! Immutable once the client is constructed. Loaded from a TOML file with
//! optional environment overrides for the credentials and base URL.

use crate::error::{Result, SmartGenError};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://www.smartgencloudplus.cn/yewu";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartGenConfig {
    pub username: String,
    pub password: String,
    /// Stored as a string even when the config file carries a number.
    #[serde(deserialize_with = "string_or_number")]
    pub company_id: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl SmartGenConfig {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        company_id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            company_id: company_id.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Load from a TOML file, apply environment overrides, validate.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SmartGenError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| SmartGenError::Config(format!("invalid config: {}", e)))
    }

    /// `SMARTGEN_USERNAME` / `SMARTGEN_PASSWORD` / `SMARTGEN_BASE_URL`
    /// take precedence over the file, so credentials can stay out of it.
    fn apply_env_overrides(&mut self) {
        if let Ok(username) = std::env::var("SMARTGEN_USERNAME") {
            self.username = username;
        }
        if let Ok(password) = std::env::var("SMARTGEN_PASSWORD") {
            self.password = password;
        }
        if let Ok(base_url) = std::env::var("SMARTGEN_BASE_URL") {
            self.base_url = base_url;
        }
    }

    /// Reject empty required fields before any network activity.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("username", &self.username),
            ("password", &self.password),
            ("company_id", &self.company_id),
            ("base_url", &self.base_url),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SmartGenError::Config(format!(
                    "missing required field: {}",
                    name
                )));
            }
        }
        Ok(())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        String(String),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n.to_string(),
        Raw::String(s) => s,
    })
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
