use reqwest::Url;

use super::GitHubError;

/// `GET /repos/{owner}/{repo}/pulls` for open pull requests against `base`.
pub fn pull_request_list_url(api_url: &str, repository: &str, base: &str) -> Result<String, GitHubError> {
    let valid_name = matches!(
        repository.split_once('/'),
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/')
    );
    if !valid_name {
        return Err(GitHubError::InvalidUrl(format!(
            "repository must be owner/name, got {repository:?}"
        )));
    }

    let raw = format!("{}/repos/{}/pulls", api_url.trim_end_matches('/'), repository);
    let mut url = Url::parse(&raw).map_err(|_| GitHubError::InvalidUrl(raw.clone()))?;
    url.query_pairs_mut()
        .append_pair("state", "open")
        .append_pair("base", base);
    Ok(url.into())
}
