use super::{DialogSurface, ModalView, SlackError};
use serde::{Deserialize, Serialize};
use serde_json::json;

const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";
pub const SLACK_API_BASE_ENV: &str = "SLACK_API_BASE";

#[derive(Debug, Clone)]
pub struct SlackApiClient {
    api_base: String,
    bot_token: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackEnvelope<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    data: T,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ViewData {
    #[serde(default)]
    view: Option<ViewInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct ViewInfo {
    id: String,
}

impl SlackApiClient {
    pub fn new(bot_token: String) -> Self {
        let api_base = std::env::var(SLACK_API_BASE_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SLACK_API_BASE.to_string());
        Self::with_api_base(bot_token, api_base)
    }

    pub fn with_api_base(bot_token: String, api_base: String) -> Self {
        Self {
            api_base,
            bot_token,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }

    fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SlackError> {
        let url = self.endpoint(path);
        let response = ureq::post(&url)
            .set("Authorization", &format!("Bearer {}", self.bot_token))
            .send_json(
                serde_json::to_value(body).map_err(|e| SlackError::ApiRequest(e.to_string()))?,
            )
            .map_err(|e| SlackError::ApiRequest(e.to_string()))?;

        response
            .into_json::<T>()
            .map_err(|e| SlackError::ApiRequest(e.to_string()))
    }

    fn call_view_method(
        &self,
        method: &'static str,
        body: &serde_json::Value,
    ) -> Result<ViewInfo, SlackError> {
        let envelope: SlackEnvelope<ViewData> = self.post_json(method, body)?;
        if !envelope.ok {
            return Err(SlackError::ApiResponse(
                envelope
                    .error
                    .unwrap_or_else(|| format!("{method} failed")),
            ));
        }
        envelope.data.view.ok_or(SlackError::MissingView(method))
    }
}

impl DialogSurface for SlackApiClient {
    fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<String, SlackError> {
        let body = json!({
            "trigger_id": trigger_id,
            "view": view,
        });
        self.call_view_method("views.open", &body).map(|info| info.id)
    }

    fn push_view(&self, trigger_id: &str, view: &ModalView) -> Result<String, SlackError> {
        let body = json!({
            "trigger_id": trigger_id,
            "view": view,
        });
        self.call_view_method("views.push", &body).map(|info| info.id)
    }

    fn update_view(&self, view_id: &str, hash: &str, view: &ModalView) -> Result<(), SlackError> {
        let mut body = json!({
            "view_id": view_id,
            "view": view,
        });
        if !hash.trim().is_empty() {
            body["hash"] = json!(hash);
        }
        self.call_view_method("views.update", &body).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = SlackApiClient::with_api_base(
            "xoxb-token".to_string(),
            "http://127.0.0.1:9/api/".to_string(),
        );
        assert_eq!(
            client.endpoint("views.open"),
            "http://127.0.0.1:9/api/views.open"
        );
    }

    #[test]
    fn envelope_reads_view_id_and_error() {
        let ok: SlackEnvelope<ViewData> =
            serde_json::from_str(r#"{"ok":true,"view":{"id":"V123","hash":"h1"}}"#)
                .expect("parse ok");
        assert!(ok.ok);
        assert_eq!(ok.data.view.map(|v| v.id).as_deref(), Some("V123"));

        let failed: SlackEnvelope<ViewData> =
            serde_json::from_str(r#"{"ok":false,"error":"expired_trigger_id"}"#)
                .expect("parse error");
        assert!(!failed.ok);
        assert_eq!(failed.error.as_deref(), Some("expired_trigger_id"));
        assert!(failed.data.view.is_none());
    }
}
