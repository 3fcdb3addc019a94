pub mod api;
pub mod views;

pub use api::{SlackApiClient, SLACK_API_BASE_ENV};
pub use views::ModalView;

#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    #[error("slack api request failed: {0}")]
    ApiRequest(String),
    #[error("slack api responded with error `{0}`")]
    ApiResponse(String),
    #[error("slack api `{0}` response did not include a view")]
    MissingView(&'static str),
}

/// The modal UI operations the dialog controller drives.
pub trait DialogSurface {
    /// Opens a new modal with a one-shot trigger id and returns the new view id.
    fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<String, SlackError>;
    /// Stacks a modal on top of the current one and returns the new view id.
    fn push_view(&self, trigger_id: &str, view: &ModalView) -> Result<String, SlackError>;
    /// Replaces a modal's content. An empty `hash` skips the optimistic-lock check.
    fn update_view(&self, view_id: &str, hash: &str, view: &ModalView) -> Result<(), SlackError>;
}
