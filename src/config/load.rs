use super::{ConfigError, Settings};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_ENV: &str = "CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const REDIS_PASSWORD_ENV: &str = "REDIS_PASSWORD";
pub const SLACK_BOT_TOKEN_ENV: &str = "SLACK_BOT_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    File(PathBuf),
    /// The config file was absent; built-in defaults are in effect.
    Defaults { missing: PathBuf },
}

#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub source: SettingsSource,
}

/// Credentials never live in the config file.
#[derive(Clone, Default)]
pub struct Secrets {
    pub redis_password: Option<String>,
    pub slack_bot_token: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("redis_password", &self.redis_password.as_ref().map(|_| "***"))
            .field("slack_bot_token", &self.slack_bot_token.as_ref().map(|_| "***"))
            .finish()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            redis_password: non_empty_env(REDIS_PASSWORD_ENV),
            slack_bot_token: non_empty_env(SLACK_BOT_TOKEN_ENV),
        }
    }

    pub fn require_slack_bot_token(&self) -> Result<&str, ConfigError> {
        self.slack_bot_token
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar(SLACK_BOT_TOKEN_ENV.to_string()))
    }
}

pub fn resolve_config_path() -> PathBuf {
    non_empty_env(CONFIG_FILE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

pub fn load_settings(path: &Path) -> Result<LoadedSettings, ConfigError> {
    if !path.exists() {
        return Ok(LoadedSettings {
            settings: Settings::default(),
            source: SettingsSource::Defaults {
                missing: path.to_path_buf(),
            },
        });
    }
    Ok(LoadedSettings {
        settings: Settings::from_path(path)?,
        source: SettingsSource::File(path.to_path_buf()),
    })
}

/// The only two conditions that stop the service before it subscribes.
/// Anything else questionable is logged at warn.
pub fn validate_startup(settings: &Settings, secrets: &Secrets) -> Result<(), ConfigError> {
    secrets.require_slack_bot_token()?;
    settings.validate()?;
    for warning in settings.warnings() {
        tracing::warn!("config: {warning}");
    }
    Ok(())
}
