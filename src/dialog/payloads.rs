use crate::bus::{PoppitCommand, PullRequest, SlackLinerMessage};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

pub const PR_COMMAND: &str = "/pr";
/// Task discriminator shared by the PR list request and its result.
pub const PR_LIST_TASK_TYPE: &str = "slash-vibe-pr-list";
pub const PR_LIST_LIMIT: usize = 50;
pub const PR_LIST_WORK_DIR: &str = "/tmp";
pub const NOTIFICATION_TTL_SECS: u64 = 86_400;
pub const PR_POSTED_EVENT_TYPE: &str = "pr_posted";

/// Stored in the PR chooser's `private_metadata`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrModalPrivateMetadata {
    pub repo: String,
}

pub fn pr_list_command(repo: &str, view_id: &str, username: &str) -> PoppitCommand {
    let mut metadata = Map::new();
    metadata.insert("view_id".to_string(), json!(view_id));
    metadata.insert("repo".to_string(), json!(repo));
    metadata.insert("username".to_string(), json!(username));

    PoppitCommand {
        repo: repo.to_string(),
        branch: String::new(),
        kind: PR_LIST_TASK_TYPE.to_string(),
        dir: PR_LIST_WORK_DIR.to_string(),
        commands: vec![format!(
            "gh pr list --repo {repo} --json number,title,author,url,headRefName --limit {PR_LIST_LIMIT}"
        )],
        metadata,
    }
}

pub fn pr_posted_text(pr: &PullRequest, repo: &str, posted_by: &str) -> String {
    format!(
        "📋 *Pull Request shared by @{posted_by}*\n\n\
         *Repository:* {repo}\n\
         *PR #{number}:* {title}\n\
         *Author:* {author}\n\
         *Link:* <{url}|View PR>",
        number = pr.number,
        title = pr.title,
        author = pr.author.login,
        url = pr.url,
    )
}

pub fn pr_posted_message(
    channel_id: &str,
    pr: &PullRequest,
    repo: &str,
    posted_by: &str,
) -> SlackLinerMessage {
    let mut metadata = Map::new();
    metadata.insert("event_type".to_string(), json!(PR_POSTED_EVENT_TYPE));
    metadata.insert(
        "event_payload".to_string(),
        json!({
            "pr_number": pr.number,
            "repository": repo,
            "pr_url": pr.url,
            "author": pr.author.login,
            "title": pr.title,
            "posted_by": posted_by,
            "branch": pr.head_ref_name,
        }),
    );

    SlackLinerMessage {
        channel: channel_id.to_string(),
        text: pr_posted_text(pr, repo, posted_by),
        ttl: NOTIFICATION_TTL_SECS,
        metadata,
    }
}
