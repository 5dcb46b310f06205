use reqwest::header::HeaderMap;
use tracing::{debug, info, instrument};

use super::message::{render_changelog_reminder, render_restricted_folder_reminder};
use super::paths::{is_changelog_file, matches_any_restricted_folder};
use super::{CommentPostIntent, PolicyError};
use crate::github::pagination::fetch_all_pages;
use crate::github::{ChangedFile, HttpClient, PullRequest};

/// Decide which reminders a newly opened pull request gets.
///
/// At most two intents come back, the changelog reminder first. Both target
/// the pull request's comment thread and greet its author.
pub fn evaluate(
    pull_request: &PullRequest,
    changed_files: &[ChangedFile],
    check_changes_md: bool,
    third_party_folders: &[String],
) -> Vec<CommentPostIntent> {
    let changed_paths: Vec<&str> = changed_files.iter().map(|f| f.filename.as_str()).collect();
    debug!(files = ?changed_paths, check_changes_md, "evaluating opened pull request");

    let needs_changelog_reminder =
        check_changes_md && !changed_paths.iter().any(|path| is_changelog_file(path));
    let needs_folder_reminder = matches_any_restricted_folder(&changed_paths, third_party_folders);

    let author = pull_request.author();
    let mut intents = Vec::new();
    if needs_changelog_reminder {
        info!(pr = pull_request.number, "CHANGES.md was not updated");
        intents.push(CommentPostIntent {
            target_url: pull_request.comments_url.clone(),
            body: render_changelog_reminder(author),
        });
    }
    if needs_folder_reminder {
        info!(pr = pull_request.number, "a third-party file changed");
        intents.push(CommentPostIntent {
            target_url: pull_request.comments_url.clone(),
            body: render_restricted_folder_reminder(author, third_party_folders),
        });
    }
    intents
}

/// Evaluate a `pull_request` webhook payload.
///
/// Fails with [`PolicyError::Validation`] before any request when the event
/// has no usable `pull_request` object. Every page of the file listing is
/// read. A failed file listing fails the whole evaluation; nothing is
/// returned to post.
#[instrument(skip_all)]
pub async fn opened_pull_request_handler(
    client: &dyn HttpClient,
    event: &serde_json::Value,
    headers: &HeaderMap,
    third_party_folders: &[String],
    check_changes_md: bool,
) -> Result<Vec<CommentPostIntent>, PolicyError> {
    let pull_request = parse_event(event)?;
    debug!(pr = pull_request.number, author = pull_request.author(), "parsed webhook event");

    let files_url = pull_request.files_url();
    let changed_files: Vec<ChangedFile> = fetch_all_pages(client, &files_url, headers).await?;

    Ok(evaluate(
        &pull_request,
        &changed_files,
        check_changes_md,
        third_party_folders,
    ))
}

fn parse_event(event: &serde_json::Value) -> Result<PullRequest, PolicyError> {
    let pull_request = event
        .get("pull_request")
        .filter(|value| value.is_object())
        .ok_or_else(|| PolicyError::Validation("event has no pull_request object".to_string()))?;

    serde_json::from_value(pull_request.clone())
        .map_err(|e| PolicyError::Validation(format!("malformed pull_request: {e}")))
}
