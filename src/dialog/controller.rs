//! Correlates the three event streams of a `/pr` dialog.
//!
//! The dialog state is never stored as such. It is inferred from which event
//! arrives and what it carries:
//!
//! ```text
//! /pr (no argument) ----------------------> Collecting (chooser open)
//! /pr <repo> | chooser submit ------------> Fetching   (loading modal, PR list requested)
//! PR list result, non-empty --------------> Presenting (session stored, PR chooser shown)
//! PR list result, empty or unparsable ----> Failed     (inline error)
//! PR chooser submit, session hit ---------> Terminal   (notification queued, session removed)
//! ```

use super::events::{PoppitOutput, SlashCommand, ViewSubmission};
use super::payloads::{
    pr_list_command, pr_posted_message, PrModalPrivateMetadata, PR_COMMAND, PR_LIST_TASK_TYPE,
};
use super::DialogError;
use crate::bus::{
    parse_pull_request_list, CommandEmitter, DialogSession, NotificationEmitter, SessionStore,
    SESSION_TTL,
};
use crate::channels::slack::views::{
    self, PR_BLOCK_ID, PR_MODAL_CALLBACK_ID, PR_SELECT_ACTION_ID, REPO_BLOCK_ID,
    REPO_INPUT_ACTION_ID, REPO_MODAL_CALLBACK_ID, REPO_SELECT_ACTION_ID,
};
use crate::channels::slack::DialogSurface;
use crate::config::{InitiationStrategy, Settings};
use crate::shared::RepoName;

/// View updates always overwrite; no view hash is tracked between hops.
pub const UNCONDITIONAL_HASH: &str = "";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    SlashCommands,
    ViewSubmissions,
    PoppitOutput,
}

impl EventSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SlashCommands => "slash_commands",
            Self::ViewSubmissions => "view_submissions",
            Self::PoppitOutput => "poppit_output",
        }
    }
}

impl std::fmt::Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What handling one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Not addressed to this service.
    Ignored,
    Collecting {
        view_id: String,
    },
    Fetching {
        view_id: String,
        repo: String,
    },
    Presenting {
        view_id: String,
        candidates: usize,
    },
    Failed {
        view_id: String,
        message: String,
    },
    Terminal {
        view_id: String,
        pr_number: u64,
    },
    /// Handling stopped early; the cause has been logged.
    Dropped,
}

pub struct DialogController<'a> {
    settings: &'a Settings,
    sessions: &'a dyn SessionStore,
    commands: &'a dyn CommandEmitter,
    notifications: &'a dyn NotificationEmitter,
    surface: &'a dyn DialogSurface,
}

fn decode<T: serde::de::DeserializeOwned>(
    what: &'static str,
    payload: &str,
) -> Result<T, DialogError> {
    serde_json::from_str(payload).map_err(|source| DialogError::Decode { what, source })
}

fn log_dropped(source: EventSource, err: &DialogError) {
    match err {
        DialogError::Validation(_)
        | DialogError::SessionMissing { .. }
        | DialogError::CandidateMissing { .. } => {
            tracing::warn!(source = source.as_str(), error = %err, "event dropped");
        }
        DialogError::UpstreamEmptyResult { .. } => {
            tracing::info!(source = source.as_str(), error = %err, "event dropped");
        }
        DialogError::Decode { .. }
        | DialogError::Encode { .. }
        | DialogError::UpstreamParse { .. }
        | DialogError::Store(_)
        | DialogError::Emit(_)
        | DialogError::Surface(_) => {
            tracing::error!(source = source.as_str(), error = %err, "event dropped");
        }
    }
}

impl<'a> DialogController<'a> {
    pub fn new(
        settings: &'a Settings,
        sessions: &'a dyn SessionStore,
        commands: &'a dyn CommandEmitter,
        notifications: &'a dyn NotificationEmitter,
        surface: &'a dyn DialogSurface,
    ) -> Self {
        Self {
            settings,
            sessions,
            commands,
            notifications,
            surface,
        }
    }

    /// Routes a raw payload by the channel it arrived on. Never fails: every
    /// error is logged here and the event is dropped.
    pub fn handle(&self, source: EventSource, payload: &str) -> Transition {
        let result = match source {
            EventSource::SlashCommands => self.on_slash_command(payload),
            EventSource::ViewSubmissions => self.on_view_submission(payload),
            EventSource::PoppitOutput => self.on_poppit_output(payload),
        };
        match result {
            Ok(transition) => {
                tracing::debug!(source = source.as_str(), ?transition, "event handled");
                transition
            }
            Err(err) => {
                log_dropped(source, &err);
                Transition::Dropped
            }
        }
    }

    pub fn handle_slash_command(&self, payload: &str) -> Transition {
        self.handle(EventSource::SlashCommands, payload)
    }

    pub fn handle_view_submission(&self, payload: &str) -> Transition {
        self.handle(EventSource::ViewSubmissions, payload)
    }

    pub fn handle_poppit_output(&self, payload: &str) -> Transition {
        self.handle(EventSource::PoppitOutput, payload)
    }

    fn on_slash_command(&self, payload: &str) -> Result<Transition, DialogError> {
        let command: SlashCommand = decode("slash command", payload)?;
        if command.command != PR_COMMAND {
            return Ok(Transition::Ignored);
        }
        tracing::info!(user = %command.user_name, "received /pr command");

        let argument = command.text.trim();
        match self.settings.dialog.initiation {
            InitiationStrategy::DirectArgument if !argument.is_empty() => {
                let repo = RepoName::parse(argument)
                    .map_err(|reason| {
                        DialogError::Validation(format!(
                            "invalid repository argument {argument:?} from {}: {reason}",
                            command.user_name
                        ))
                    })?
                    .qualified(&self.settings.github.org);
                tracing::info!(repo = %repo, "repository argument provided, skipping chooser");

                let view_id = self
                    .surface
                    .open_view(&command.trigger_id, &views::loading_modal())
                    .map_err(DialogError::Surface)?;
                self.request_pr_list(&repo, view_id, &command.user_name)
            }
            strategy => {
                let initial_value = (!argument.is_empty()).then_some(argument);
                if strategy == InitiationStrategy::AlwaysChooser && initial_value.is_some() {
                    tracing::debug!(argument, "pre-filling repository chooser");
                }
                let modal = views::repo_chooser_modal(&self.settings.github.repos, initial_value);
                let view_id = self
                    .surface
                    .open_view(&command.trigger_id, &modal)
                    .map_err(DialogError::Surface)?;
                tracing::debug!(view_id = %view_id, "repository chooser opened");
                Ok(Transition::Collecting { view_id })
            }
        }
    }

    fn on_view_submission(&self, payload: &str) -> Result<Transition, DialogError> {
        let submission: ViewSubmission = decode("view submission", payload)?;
        match submission.view.callback_id.as_str() {
            PR_MODAL_CALLBACK_ID => self.post_selected_pr(&submission),
            REPO_MODAL_CALLBACK_ID => self.fetch_chosen_repo(&submission),
            _ => Ok(Transition::Ignored),
        }
    }

    /// Chooser submit. Slack closes the submitted chooser once the submission
    /// is acknowledged, so the loading modal is opened as a new root with this
    /// submission's own trigger id.
    fn fetch_chosen_repo(&self, submission: &ViewSubmission) -> Result<Transition, DialogError> {
        let values = &submission.view.state.values;
        let choice = values
            .text(REPO_BLOCK_ID, REPO_SELECT_ACTION_ID)
            .or_else(|| values.text(REPO_BLOCK_ID, REPO_INPUT_ACTION_ID))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                DialogError::Validation(format!(
                    "repository chooser submission from {} has no repository",
                    submission.user.username
                ))
            })?;
        let repo = self.resolve_chosen_repo(choice, &submission.user.username)?;
        tracing::info!(user = %submission.user.username, repo = %repo, "repository chosen");

        let view_id = self
            .surface
            .open_view(&submission.trigger_id, &views::loading_modal())
            .map_err(DialogError::Surface)?;
        self.request_pr_list(&repo, view_id, &submission.user.username)
    }

    fn resolve_chosen_repo(&self, choice: &str, user: &str) -> Result<String, DialogError> {
        if self.settings.github.is_listed_repo(choice) {
            return Ok(choice.to_string());
        }
        RepoName::parse(choice)
            .map(|name| name.qualified(&self.settings.github.org))
            .map_err(|reason| {
                DialogError::Validation(format!(
                    "invalid repository choice {choice:?} from {user}: {reason}"
                ))
            })
    }

    fn request_pr_list(
        &self,
        repo: &str,
        view_id: String,
        username: &str,
    ) -> Result<Transition, DialogError> {
        let command = pr_list_command(repo, &view_id, username);
        self.commands
            .emit_execution_request(&command)
            .map_err(DialogError::Emit)?;
        tracing::info!(repo, view_id = %view_id, "requested open pull request list");
        Ok(Transition::Fetching {
            view_id,
            repo: repo.to_string(),
        })
    }

    fn on_poppit_output(&self, payload: &str) -> Result<Transition, DialogError> {
        let output: PoppitOutput = decode("poppit output", payload)?;
        if output.kind != PR_LIST_TASK_TYPE {
            return Ok(Transition::Ignored);
        }
        tracing::debug!("received poppit pull request list output");

        let (Some(view_id), Some(repo)) =
            (output.metadata_str("view_id"), output.metadata_str("repo"))
        else {
            return Err(DialogError::Validation(
                "poppit pull request list output is missing view_id or repo metadata".to_string(),
            ));
        };
        let username = output.metadata_str("username").unwrap_or_default();

        let prs = match parse_pull_request_list(&output.output) {
            Ok(prs) => prs,
            Err(source) => {
                let err = DialogError::UpstreamParse {
                    repo: repo.to_string(),
                    source,
                };
                return Ok(self.fail_inline(view_id, err));
            }
        };
        if prs.is_empty() {
            let err = DialogError::UpstreamEmptyResult {
                repo: repo.to_string(),
            };
            return Ok(self.fail_inline(view_id, err));
        }
        tracing::info!(
            count = prs.len(),
            repo,
            user = username,
            "found open pull requests"
        );

        let session = DialogSession {
            repo: repo.to_string(),
            prs,
        };
        self.sessions
            .put(view_id, &session, SESSION_TTL)
            .map_err(DialogError::Store)?;

        let private_metadata = serde_json::to_string(&PrModalPrivateMetadata {
            repo: session.repo.clone(),
        })
        .map_err(|source| DialogError::Encode {
            what: "pr chooser private metadata",
            source,
        })?;
        let modal = views::pr_chooser_modal(&session.prs, &session.repo, &private_metadata);
        self.surface
            .update_view(view_id, UNCONDITIONAL_HASH, &modal)
            .map_err(DialogError::Surface)?;
        tracing::debug!(view_id, "pull request chooser shown");

        Ok(Transition::Presenting {
            view_id: view_id.to_string(),
            candidates: session.prs.len(),
        })
    }

    /// Replaces the loading modal with an error. A failed update is logged only.
    fn fail_inline(&self, view_id: &str, err: DialogError) -> Transition {
        log_dropped(EventSource::PoppitOutput, &err);
        let message = err.user_message().unwrap_or_else(|| err.to_string());
        if let Err(update_err) =
            self.surface
                .update_view(view_id, UNCONDITIONAL_HASH, &views::error_modal(&message))
        {
            tracing::error!(view_id, error = %update_err, "failed to show error in modal");
        }
        Transition::Failed {
            view_id: view_id.to_string(),
            message,
        }
    }

    fn post_selected_pr(&self, submission: &ViewSubmission) -> Result<Transition, DialogError> {
        let view_id = submission.view.id.as_str();
        let posted_by = submission.user.username.as_str();
        let key = submission
            .view
            .state
            .values
            .text(PR_BLOCK_ID, PR_SELECT_ACTION_ID)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                DialogError::Validation(format!(
                    "pull request selection for view {view_id} has no PR number"
                ))
            })?;

        let session = self
            .sessions
            .get(view_id)
            .map_err(DialogError::Store)?
            .ok_or_else(|| DialogError::SessionMissing {
                view_id: view_id.to_string(),
            })?;
        warn_on_metadata_mismatch(view_id, &submission.view.private_metadata, &session.repo);

        // TODO: tell the user when the chosen PR is no longer in the session
        // instead of dropping the submission silently.
        let pr = session
            .find(key)
            .ok_or_else(|| DialogError::CandidateMissing {
                view_id: view_id.to_string(),
                key: key.to_string(),
            })?;
        tracing::info!(
            user = posted_by,
            pr_number = pr.number,
            repo = %session.repo,
            "pull request selected"
        );

        let message = pr_posted_message(
            &self.settings.slack.channel_id,
            pr,
            &session.repo,
            posted_by,
        );
        self.notifications
            .emit_notification(&message)
            .map_err(DialogError::Emit)?;

        if let Err(err) = self.sessions.delete(view_id) {
            tracing::warn!(view_id, error = %err, "failed to delete dialog session");
        }
        tracing::info!(pr_number = pr.number, repo = %session.repo, "pull request posted to channel");

        Ok(Transition::Terminal {
            view_id: view_id.to_string(),
            pr_number: pr.number,
        })
    }
}

fn warn_on_metadata_mismatch(view_id: &str, raw: &str, session_repo: &str) {
    if raw.trim().is_empty() {
        return;
    }
    match serde_json::from_str::<PrModalPrivateMetadata>(raw) {
        Ok(meta) if !meta.repo.is_empty() && meta.repo != session_repo => {
            tracing::warn!(
                view_id,
                metadata_repo = %meta.repo,
                session_repo,
                "private metadata disagrees with session; using session"
            );
        }
        Ok(_) => {}
        Err(err) => {
            tracing::debug!(view_id, error = %err, "ignoring unreadable private metadata");
        }
    }
}
