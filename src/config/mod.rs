pub mod error;
pub mod load;
pub mod settings;

pub use error::ConfigError;
pub use load::{
    load_settings, resolve_config_path, validate_startup, LoadedSettings, Secrets,
    SettingsSource, CONFIG_FILE_ENV, DEFAULT_CONFIG_FILE, REDIS_PASSWORD_ENV, SLACK_BOT_TOKEN_ENV,
};
pub use settings::{
    ChannelNames, DialogSettings, GithubSettings, InitiationStrategy, ListNames, LoggingSettings,
    RedisSettings, Settings, SlackSettings,
};
