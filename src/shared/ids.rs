/// Checks a bare repository name (no owner) supplied as free text.
pub fn validate_repo_name(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("repository name must be non-empty".to_string());
    }
    if value.contains("..") {
        return Err("repository name must not contain `..`".to_string());
    }
    if value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_')
    {
        return Ok(());
    }
    Err("repository name must use only ASCII letters, digits, '.', '-' or '_'".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepoName(String);

impl RepoName {
    pub fn parse(raw: &str) -> Result<Self, String> {
        validate_repo_name(raw)?;
        Ok(Self(raw.to_string()))
    }

    /// `owner/name`, or the bare name when no owner is configured.
    pub fn qualified(&self, owner: &str) -> String {
        let owner = owner.trim().trim_end_matches('/');
        if owner.is_empty() {
            return self.0.clone();
        }
        format!("{owner}/{}", self.0)
    }
}
