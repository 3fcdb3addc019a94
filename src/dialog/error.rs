use crate::bus::BusError;
use crate::channels::slack::SlackError;

/// Everything that can end the handling of one inbound event. None of these
/// outlive the event that produced them.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("malformed {what} payload: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Validation(String),
    #[error("no open pull requests found for {repo}")]
    UpstreamEmptyResult { repo: String },
    #[error("failed to parse pull request list for {repo}: {source}")]
    UpstreamParse {
        repo: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no dialog session for view {view_id}; expired or unknown")]
    SessionMissing { view_id: String },
    #[error("PR #{key} is not in the dialog session for view {view_id}")]
    CandidateMissing { view_id: String, key: String },
    #[error("session store failed: {0}")]
    Store(#[source] BusError),
    #[error("failed to enqueue outbound message: {0}")]
    Emit(#[source] BusError),
    #[error("slack view operation failed: {0}")]
    Surface(#[source] SlackError),
}

impl DialogError {
    /// Text shown in the dialog itself. Only upstream result failures reach the user.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::UpstreamEmptyResult { repo } => {
                Some(format!("No open pull requests found for `{repo}`."))
            }
            Self::UpstreamParse { .. } => {
                Some("Failed to parse the pull request list. Please try again.".to_string())
            }
            _ => None,
        }
    }
}
