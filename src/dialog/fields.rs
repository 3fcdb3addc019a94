use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// One submitted form element, reduced to the kinds the dialogs use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    PlainText(Option<String>),
    SingleSelect(Option<String>),
    Unsupported,
}

impl FieldValue {
    pub fn from_json(raw: &Value) -> Self {
        if let Some(option) = raw.get("selected_option") {
            return Self::SingleSelect(
                option
                    .get("value")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            );
        }
        if let Some(value) = raw.get("value") {
            return Self::PlainText(value.as_str().map(str::to_string));
        }
        match raw.get("type").and_then(Value::as_str) {
            Some(kind) if kind.ends_with("_select") => Self::SingleSelect(None),
            Some("plain_text_input") => Self::PlainText(None),
            _ => Self::Unsupported,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::PlainText(value) | Self::SingleSelect(value) => value.as_deref(),
            Self::Unsupported => None,
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&raw))
    }
}

/// `view.state.values`: block id -> action id -> element value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, BTreeMap<String, FieldValue>>);

impl FormValues {
    /// Non-empty text of a plain-text input or the value of a selected option.
    pub fn text(&self, block_id: &str, action_id: &str) -> Option<&str> {
        self.0
            .get(block_id)
            .and_then(|block| block.get(action_id))
            .and_then(FieldValue::as_text)
            .filter(|value| !value.is_empty())
    }
}
