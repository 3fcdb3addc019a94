pub mod ids;

pub use ids::{validate_repo_name, RepoName};
