use super::FormValues;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Relays forward Slack's `null` for absent optional fields; read those as the default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Slash command relayed from Slack onto the slash-commands channel.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SlashCommand {
    #[serde(deserialize_with = "null_as_default")]
    pub command: String,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub response_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub trigger_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub channel_id: String,
}

/// `view_submission` interaction relayed onto the view-submissions channel.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ViewSubmission {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub trigger_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub view: SubmittedView,
    #[serde(deserialize_with = "null_as_default")]
    pub user: SubmittingUser,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubmittedView {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hash: String,
    #[serde(deserialize_with = "null_as_default")]
    pub callback_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub private_metadata: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: ViewState,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ViewState {
    #[serde(deserialize_with = "null_as_default")]
    pub values: FormValues,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubmittingUser {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
}

/// Result published by Poppit after running a command. `metadata` is echoed
/// verbatim from the originating [`crate::bus::PoppitCommand`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PoppitOutput {
    pub metadata: Option<Map<String, Value>>,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub command: String,
    #[serde(deserialize_with = "null_as_default")]
    pub output: String,
}

impl PoppitOutput {
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|metadata| metadata.get(key))
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}
