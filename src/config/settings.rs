use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_REDIS_ADDR: &str = "host.docker.internal:6379";
const DEFAULT_SLASH_COMMANDS_CHANNEL: &str = "slack-commands";
const DEFAULT_VIEW_SUBMISSIONS_CHANNEL: &str = "slack-relay-view-submission";
const DEFAULT_POPPIT_OUTPUT_CHANNEL: &str = "poppit:command-output";
const DEFAULT_POPPIT_COMMANDS_LIST: &str = "poppit:commands";
const DEFAULT_SLACKLINER_MESSAGES_LIST: &str = "slack_messages";
const DEFAULT_LOG_LEVEL: &str = "INFO";

/// How a `/pr` invocation starts the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InitiationStrategy {
    /// A repository argument skips the chooser; no argument opens it.
    #[default]
    DirectArgument,
    /// The chooser always opens; an argument only pre-fills the text entry.
    AlwaysChooser,
}

impl InitiationStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DirectArgument => "direct_argument",
            Self::AlwaysChooser => "always_chooser",
        }
    }
}

impl std::fmt::Display for InitiationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub redis: RedisSettings,
    pub channels: ChannelNames,
    pub lists: ListNames,
    pub slack: SlackSettings,
    pub github: GithubSettings,
    pub dialog: DialogSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisSettings {
    pub addr: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            addr: DEFAULT_REDIS_ADDR.to_string(),
        }
    }
}

/// Pub/sub channels the service subscribes to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChannelNames {
    pub slash_commands: String,
    pub view_submissions: String,
    pub poppit_output: String,
}

impl Default for ChannelNames {
    fn default() -> Self {
        Self {
            slash_commands: DEFAULT_SLASH_COMMANDS_CHANNEL.to_string(),
            view_submissions: DEFAULT_VIEW_SUBMISSIONS_CHANNEL.to_string(),
            poppit_output: DEFAULT_POPPIT_OUTPUT_CHANNEL.to_string(),
        }
    }
}

/// Work lists the service pushes onto.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListNames {
    pub poppit_commands: String,
    pub slackliner_messages: String,
}

impl Default for ListNames {
    fn default() -> Self {
        Self {
            poppit_commands: DEFAULT_POPPIT_COMMANDS_LIST.to_string(),
            slackliner_messages: DEFAULT_SLACKLINER_MESSAGES_LIST.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SlackSettings {
    pub channel_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GithubSettings {
    pub org: String,
    /// Fully qualified `owner/name` entries offered by the chooser dropdown.
    pub repos: Vec<String>,
}

impl GithubSettings {
    pub fn is_listed_repo(&self, value: &str) -> bool {
        self.repos.iter().any(|repo| repo == value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DialogSettings {
    pub initiation: InitiationStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parses YAML over the built-in defaults. An empty document yields the defaults.
    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Fails only when the destination channel is missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slack.channel_id.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`slack.channel_id` must be set".to_string(),
            ));
        }
        Ok(())
    }

    /// Suspicious values that do not stop startup.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for (key, value) in [
            ("redis.addr", &self.redis.addr),
            ("channels.slash_commands", &self.channels.slash_commands),
            ("channels.view_submissions", &self.channels.view_submissions),
            ("channels.poppit_output", &self.channels.poppit_output),
            ("lists.poppit_commands", &self.lists.poppit_commands),
            ("lists.slackliner_messages", &self.lists.slackliner_messages),
        ] {
            if value.trim().is_empty() {
                warnings.push(format!("`{key}` is empty"));
            }
        }
        for repo in &self.github.repos {
            let qualified = repo
                .split_once('/')
                .map(|(owner, name)| !owner.trim().is_empty() && !name.trim().is_empty())
                .unwrap_or(false);
            if !qualified {
                warnings.push(format!(
                    "`github.repos` entry `{repo}` is not in `owner/name` form"
                ));
            }
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_yaml_uses_defaults() {
        let settings = Settings::from_yaml_str("").expect("parse");
        assert_eq!(settings.redis.addr, "host.docker.internal:6379");
        assert_eq!(settings.channels.slash_commands, "slack-commands");
        assert_eq!(
            settings.channels.view_submissions,
            "slack-relay-view-submission"
        );
        assert_eq!(settings.channels.poppit_output, "poppit:command-output");
        assert_eq!(settings.lists.poppit_commands, "poppit:commands");
        assert_eq!(settings.lists.slackliner_messages, "slack_messages");
        assert_eq!(settings.logging.level, "INFO");
        assert_eq!(settings.dialog.initiation, InitiationStrategy::DirectArgument);
        assert!(settings.github.repos.is_empty());
    }

    #[test]
    fn full_yaml_overrides_every_field() {
        let settings = Settings::from_yaml_str(
            r#"
redis:
  addr: myredis:6380
channels:
  slash_commands: my-commands
  view_submissions: my-view-submissions
  poppit_output: my-poppit-output
lists:
  poppit_commands: my-poppit-commands
  slackliner_messages: my-slack-messages
slack:
  channel_id: CMYCHANNEL
github:
  org: my-org
  repos:
    - my-org/repo-a
    - my-org/repo-b
dialog:
  initiation: always_chooser
logging:
  level: DEBUG
"#,
        )
        .expect("parse");

        assert_eq!(settings.redis.addr, "myredis:6380");
        assert_eq!(settings.channels.slash_commands, "my-commands");
        assert_eq!(settings.channels.view_submissions, "my-view-submissions");
        assert_eq!(settings.channels.poppit_output, "my-poppit-output");
        assert_eq!(settings.lists.poppit_commands, "my-poppit-commands");
        assert_eq!(settings.lists.slackliner_messages, "my-slack-messages");
        assert_eq!(settings.slack.channel_id, "CMYCHANNEL");
        assert_eq!(settings.github.org, "my-org");
        assert_eq!(
            settings.github.repos,
            vec!["my-org/repo-a".to_string(), "my-org/repo-b".to_string()]
        );
        assert_eq!(settings.dialog.initiation, InitiationStrategy::AlwaysChooser);
        assert_eq!(settings.logging.level, "DEBUG");
        settings.validate().expect("valid");
    }

    #[test]
    fn partial_yaml_keeps_sibling_defaults() {
        let settings = Settings::from_yaml_str(
            r#"
slack:
  channel_id: CPARTIAL
channels:
  slash_commands: only-this
"#,
        )
        .expect("parse");

        assert_eq!(settings.slack.channel_id, "CPARTIAL");
        assert_eq!(settings.redis.addr, "host.docker.internal:6379");
        assert_eq!(settings.channels.slash_commands, "only-this");
        assert_eq!(
            settings.channels.view_submissions,
            "slack-relay-view-submission"
        );
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        assert!(Settings::from_yaml_str("not: valid: yaml: [").is_err());
    }

    #[test]
    fn unknown_initiation_strategy_is_rejected() {
        assert!(Settings::from_yaml_str("dialog:\n  initiation: sometimes\n").is_err());
    }

    #[test]
    fn validate_requires_destination_channel() {
        let err = Settings::default().validate().expect_err("must fail");
        assert!(err.to_string().contains("slack.channel_id"));
    }

    #[test]
    fn unqualified_repo_and_empty_names_only_warn() {
        let mut settings = Settings::default();
        settings.slack.channel_id = "C1".to_string();
        settings.github.repos = vec!["repo-without-owner".to_string(), "acme/web".to_string()];
        settings.lists.poppit_commands = "  ".to_string();
        settings.validate().expect("still valid");

        let warnings = settings.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings
            .iter()
            .any(|w| w.contains("repo-without-owner") && w.contains("owner/name")));
        assert!(warnings.iter().any(|w| w.contains("lists.poppit_commands")));
    }

    #[test]
    fn default_settings_have_no_warnings() {
        assert!(Settings::default().warnings().is_empty());
    }

    #[test]
    fn from_path_reports_parse_errors_with_path() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.yaml");
        fs::write(&path, "redis: [").expect("write");
        let err = Settings::from_path(&path).expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.yaml"));
    }
}
