use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Work item pushed to the Poppit command list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoppitCommand {
    pub repo: String,
    pub branch: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub dir: String,
    pub commands: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

/// Message pushed to the SlackLiner posting list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlackLinerMessage {
    pub channel: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub ttl: u64,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// One entry of `gh pr list --json number,title,author,url,headRefName`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: PullRequestAuthor,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "headRefName")]
    pub head_ref_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestAuthor {
    #[serde(default)]
    pub login: String,
}

pub fn parse_pull_request_list(output: &str) -> Result<Vec<PullRequest>, serde_json::Error> {
    serde_json::from_str(output.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_gh_pr_list_output() {
        let raw = r#"
        [
            {"number": 1, "title": "Fix bug", "author": {"login": "alice"}, "url": "https://github.com/org/repo/pull/1", "headRefName": "fix/bug"},
            {"number": 2, "title": "Add feature", "author": {"login": "bob"}, "url": "https://github.com/org/repo/pull/2", "headRefName": "feat/feature"}
        ]
        "#;
        let prs = parse_pull_request_list(raw).expect("parse");
        assert_eq!(prs.len(), 2);
        assert_eq!(prs[0].number, 1);
        assert_eq!(prs[0].title, "Fix bug");
        assert_eq!(prs[0].author.login, "alice");
        assert_eq!(prs[0].head_ref_name, "fix/bug");
        assert_eq!(prs[1].author.login, "bob");
    }

    #[test]
    fn empty_array_parses_to_no_items() {
        assert!(parse_pull_request_list("[]\n").expect("parse").is_empty());
    }

    #[test]
    fn non_list_output_is_a_parse_error() {
        assert!(parse_pull_request_list("gh: command not found").is_err());
        assert!(parse_pull_request_list(r#"{"number": 1}"#).is_err());
        assert!(parse_pull_request_list(r#"[{"title": "no number"}]"#).is_err());
    }

    #[test]
    fn poppit_command_uses_type_field() {
        let mut metadata = Map::new();
        metadata.insert("view_id".to_string(), json!("V1"));
        let command = PoppitCommand {
            repo: "acme/api".to_string(),
            branch: String::new(),
            kind: "slash-vibe-pr-list".to_string(),
            dir: "/tmp".to_string(),
            commands: vec!["gh pr list".to_string()],
            metadata,
        };
        let encoded = serde_json::to_value(&command).expect("encode");
        assert_eq!(encoded["type"], "slash-vibe-pr-list");
        assert_eq!(encoded["branch"], "");
        assert_eq!(encoded["metadata"]["view_id"], "V1");
    }

    #[test]
    fn slackliner_message_omits_empty_optional_fields() {
        let message = SlackLinerMessage {
            channel: "C12345".to_string(),
            text: "hello".to_string(),
            ttl: 0,
            metadata: Map::new(),
        };
        let encoded = serde_json::to_value(&message).expect("encode");
        assert_eq!(encoded, json!({"channel": "C12345", "text": "hello"}));
    }
}
