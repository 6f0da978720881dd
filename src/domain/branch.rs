use serde::Serialize;

/// Snapshot returned by `get_info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryInfo {
    pub default_branch: String,
}

/// Branch name behind a symbolic ref target (e.g., "refs/heads/main" -> "main")
pub fn branch_name_from_ref(target: &str) -> Option<&str> {
    target
        .strip_prefix("refs/heads/")
        .filter(|name| !name.is_empty())
}
