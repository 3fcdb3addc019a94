//! Modal payloads for the `/pr` dialog. These are opaque to the controller:
//! it picks which modal to show, this module decides what the modal looks like.

use crate::bus::PullRequest;
use serde::Serialize;

pub const REPO_MODAL_CALLBACK_ID: &str = "select_pr_repo_modal";
pub const PR_MODAL_CALLBACK_ID: &str = "select_pr_modal";
pub const REPO_BLOCK_ID: &str = "repo_block";
pub const REPO_INPUT_ACTION_ID: &str = "repo_input";
pub const REPO_SELECT_ACTION_ID: &str = "repo_select";
pub const PR_BLOCK_ID: &str = "pr_block";
pub const PR_SELECT_ACTION_ID: &str = "pr_select";

/// Slack rejects option labels longer than this.
pub const OPTION_TEXT_MAX_CHARS: usize = 75;
const OPTION_TEXT_ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    PlainText,
    Mrkdwn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: TextKind,
    pub text: String,
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: TextKind::PlainText,
            text: text.into(),
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            kind: TextKind::Mrkdwn,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionObject {
    pub text: TextObject,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    StaticSelect {
        action_id: String,
        placeholder: TextObject,
        options: Vec<OptionObject>,
    },
    PlainTextInput {
        action_id: String,
        placeholder: TextObject,
        #[serde(skip_serializing_if = "Option::is_none")]
        initial_value: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        text: TextObject,
    },
    Input {
        block_id: String,
        label: TextObject,
        element: Element,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModalView {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_metadata: Option<String>,
    pub title: TextObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit: Option<TextObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<TextObject>,
    pub blocks: Vec<Block>,
}

impl ModalView {
    fn new(title: &str) -> Self {
        Self {
            kind: "modal",
            callback_id: None,
            private_metadata: None,
            title: TextObject::plain(title),
            submit: None,
            close: None,
            blocks: Vec::new(),
        }
    }

    pub fn input_element(&self, block_id: &str) -> Option<&Element> {
        self.blocks.iter().find_map(|block| match block {
            Block::Input {
                block_id: id,
                element,
                ..
            } if id == block_id => Some(element),
            _ => None,
        })
    }
}

/// Caps an option label at [`OPTION_TEXT_MAX_CHARS`] characters, ending in `...` when cut.
pub fn truncate_option_text(text: &str) -> String {
    if text.chars().count() <= OPTION_TEXT_MAX_CHARS {
        return text.to_string();
    }
    let keep = OPTION_TEXT_MAX_CHARS - OPTION_TEXT_ELLIPSIS.len();
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(OPTION_TEXT_ELLIPSIS);
    truncated
}

pub fn pull_request_option(pr: &PullRequest) -> OptionObject {
    OptionObject {
        text: TextObject::plain(truncate_option_text(&format!(
            "#{}: {}",
            pr.number, pr.title
        ))),
        value: pr.number.to_string(),
    }
}

/// Chooser for the repository. Lists `repos` in a dropdown when any are
/// configured, otherwise asks for a repository name as free text.
pub fn repo_chooser_modal(repos: &[String], initial_value: Option<&str>) -> ModalView {
    let (prompt, element) = if repos.is_empty() {
        (
            "Enter a repository name to list its open pull requests.",
            Element::PlainTextInput {
                action_id: REPO_INPUT_ACTION_ID.to_string(),
                placeholder: TextObject::plain("e.g. billing-service"),
                initial_value: initial_value
                    .filter(|v| !v.trim().is_empty())
                    .map(str::to_string),
            },
        )
    } else {
        (
            "Select a repository to list its open pull requests.",
            Element::StaticSelect {
                action_id: REPO_SELECT_ACTION_ID.to_string(),
                placeholder: TextObject::plain("Choose a repository"),
                options: repos
                    .iter()
                    .map(|repo| OptionObject {
                        text: TextObject::plain(truncate_option_text(repo)),
                        value: repo.clone(),
                    })
                    .collect(),
            },
        )
    };

    let mut modal = ModalView::new("Select Repository");
    modal.callback_id = Some(REPO_MODAL_CALLBACK_ID.to_string());
    modal.submit = Some(TextObject::plain("List PRs"));
    modal.close = Some(TextObject::plain("Cancel"));
    modal.blocks = vec![
        Block::Section {
            text: TextObject::markdown(prompt),
        },
        Block::Input {
            block_id: REPO_BLOCK_ID.to_string(),
            label: TextObject::plain("Repository"),
            element,
        },
    ];
    modal
}

/// Placeholder shown while the command runner fetches pull requests.
pub fn loading_modal() -> ModalView {
    let mut modal = ModalView::new("Loading PRs...");
    modal.close = Some(TextObject::plain("Cancel"));
    modal.blocks = vec![Block::Section {
        text: TextObject::markdown(
            ":hourglass_flowing_sand: Fetching open pull requests, please wait...",
        ),
    }];
    modal
}

pub fn pr_chooser_modal(prs: &[PullRequest], repo: &str, private_metadata: &str) -> ModalView {
    let mut modal = ModalView::new("Select a Pull Request");
    modal.callback_id = Some(PR_MODAL_CALLBACK_ID.to_string());
    modal.private_metadata = Some(private_metadata.to_string());
    modal.submit = Some(TextObject::plain("Post to Channel"));
    modal.close = Some(TextObject::plain("Cancel"));
    modal.blocks = vec![
        Block::Section {
            text: TextObject::markdown(format!(
                "*{repo}* - select a pull request to post to the channel."
            )),
        },
        Block::Input {
            block_id: PR_BLOCK_ID.to_string(),
            label: TextObject::plain("Pull Request"),
            element: Element::StaticSelect {
                action_id: PR_SELECT_ACTION_ID.to_string(),
                placeholder: TextObject::plain("Choose a pull request"),
                options: prs.iter().map(pull_request_option).collect(),
            },
        },
    ];
    modal
}

pub fn error_modal(message: &str) -> ModalView {
    let mut modal = ModalView::new("Error");
    modal.close = Some(TextObject::plain("Close"));
    modal.blocks = vec![Block::Section {
        text: TextObject::markdown(format!(":x: {message}")),
    }];
    modal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::PullRequestAuthor;

    fn pr(number: u64, title: &str) -> PullRequest {
        PullRequest {
            number,
            title: title.to_string(),
            author: PullRequestAuthor::default(),
            url: String::new(),
            head_ref_name: String::new(),
        }
    }

    fn select_options(modal: &ModalView, block_id: &str) -> Vec<OptionObject> {
        match modal.input_element(block_id) {
            Some(Element::StaticSelect { options, .. }) => options.clone(),
            other => panic!("expected static select, got {other:?}"),
        }
    }

    #[test]
    fn repo_chooser_uses_text_input_without_configured_repos() {
        let modal = repo_chooser_modal(&[], Some("billing-service"));
        assert_eq!(modal.callback_id.as_deref(), Some(REPO_MODAL_CALLBACK_ID));
        assert_eq!(modal.submit.as_ref().map(|t| t.text.as_str()), Some("List PRs"));
        assert_eq!(modal.blocks.len(), 2);
        match modal.input_element(REPO_BLOCK_ID) {
            Some(Element::PlainTextInput {
                action_id,
                initial_value,
                ..
            }) => {
                assert_eq!(action_id, REPO_INPUT_ACTION_ID);
                assert_eq!(initial_value.as_deref(), Some("billing-service"));
            }
            other => panic!("expected plain text input, got {other:?}"),
        }
    }

    #[test]
    fn repo_chooser_lists_configured_repos() {
        let repos = vec!["org/repo1".to_string(), "org/repo2".to_string()];
        let modal = repo_chooser_modal(&repos, None);
        let options = select_options(&modal, REPO_BLOCK_ID);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].value, "org/repo1");
        assert_eq!(options[1].value, "org/repo2");
    }

    #[test]
    fn loading_modal_has_no_submit() {
        let modal = loading_modal();
        assert!(modal.submit.is_none());
        assert!(modal.callback_id.is_none());
        assert_eq!(modal.blocks.len(), 1);
    }

    #[test]
    fn pr_chooser_carries_metadata_and_options() {
        let prs = vec![pr(42, "My PR"), pr(100, "Another PR")];
        let modal = pr_chooser_modal(&prs, "org/repo", r#"{"repo":"org/repo"}"#);
        assert_eq!(modal.callback_id.as_deref(), Some(PR_MODAL_CALLBACK_ID));
        assert_eq!(
            modal.private_metadata.as_deref(),
            Some(r#"{"repo":"org/repo"}"#)
        );
        assert_eq!(
            modal.submit.as_ref().map(|t| t.text.as_str()),
            Some("Post to Channel")
        );
        let options = select_options(&modal, PR_BLOCK_ID);
        assert_eq!(options[0].value, "42");
        assert_eq!(options[0].text.text, "#42: My PR");
        assert_eq!(options[1].value, "100");
    }

    #[test]
    fn long_titles_are_truncated_to_limit() {
        let modal = pr_chooser_modal(&[pr(1, &"a".repeat(100))], "org/repo", "");
        let text = &select_options(&modal, PR_BLOCK_ID)[0].text.text;
        assert_eq!(text.chars().count(), OPTION_TEXT_MAX_CHARS);
        assert!(text.ends_with("..."));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let title = "é".repeat(80);
        let truncated = truncate_option_text(&title);
        assert_eq!(truncated.chars().count(), OPTION_TEXT_MAX_CHARS);
        assert_eq!(truncate_option_text("short"), "short");
    }

    #[test]
    fn error_modal_renders_message() {
        let modal = error_modal("something went wrong");
        assert!(modal.submit.is_none());
        assert_eq!(modal.blocks.len(), 1);
        let encoded = serde_json::to_value(&modal).expect("encode");
        assert_eq!(encoded["type"], "modal");
        assert_eq!(encoded["blocks"][0]["type"], "section");
        assert_eq!(
            encoded["blocks"][0]["text"]["text"],
            ":x: something went wrong"
        );
    }

    #[test]
    fn serialized_select_matches_block_kit_shape() {
        let modal = pr_chooser_modal(&[pr(7, "Fix")], "acme/api", "{}");
        let encoded = serde_json::to_value(&modal).expect("encode");
        let input = &encoded["blocks"][1];
        assert_eq!(input["type"], "input");
        assert_eq!(input["block_id"], "pr_block");
        assert_eq!(input["element"]["type"], "static_select");
        assert_eq!(input["element"]["action_id"], "pr_select");
        assert_eq!(input["element"]["options"][0]["value"], "7");
        assert_eq!(input["element"]["options"][0]["text"]["type"], "plain_text");
        assert!(encoded.get("hash").is_none());
    }
}
