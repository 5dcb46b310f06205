use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, info_span, instrument, Instrument};

use super::comments::fetch_last_comment_page;
use super::message::render_stale_message;
use super::staleness::{days_since, is_stale, Clock};
use super::stop::contains_stop_command;
use super::{post_intents, CommentPostIntent, PolicyError};
use crate::config::{ConfigError, RepositorySettings};
use crate::github::pagination::fetch_all_pages;
use crate::github::pulls::pull_request_list_url;
use crate::github::types::PullRequestState;
use crate::github::{HttpClient, PullRequest};

/// Whether decided intents are posted or only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Post,
    DryRun,
}

/// Outcome of one stale-bump run.
#[derive(Debug, Default)]
pub struct JobSummary {
    /// Every reminder decided, in repository then pull-request order
    pub intents: Vec<CommentPostIntent>,
    /// Repositories that hit a transport error
    pub failed_repositories: Vec<String>,
}

/// Decide whether one pull request gets a stale reminder.
///
/// The anchor is the last comment on the last page of the thread, or the
/// pull request's creation time when nobody has commented yet. A stop
/// command anywhere on that page wins over staleness.
#[instrument(skip_all, fields(pr = pull_request.number))]
pub async fn evaluate_pull_request(
    client: &dyn HttpClient,
    pull_request: &PullRequest,
    settings: &RepositorySettings,
    repository: &str,
    bot_login: &str,
    now: DateTime<Utc>,
) -> Result<Option<CommentPostIntent>, PolicyError> {
    let comments =
        fetch_last_comment_page(client, &pull_request.comments_url, &settings.headers).await?;

    if contains_stop_command(&comments, bot_login) {
        info!("stop command found, skipping");
        return Ok(None);
    }

    let last_activity = comments
        .last()
        .map(|c| c.created_at)
        .unwrap_or(pull_request.created_at);
    let idle_days = days_since(last_activity, now);
    debug!(comments = comments.len(), idle_days, "checked comment thread");

    if !is_stale(last_activity, now, settings.max_days_since_update) {
        return Ok(None);
    }

    let template = settings.stale_template(repository)?;
    let body = render_stale_message(template, settings.max_days_since_update).map_err(|source| {
        ConfigError::Template {
            repository: repository.to_string(),
            source,
        }
    })?;

    info!(idle_days, "pull request is stale");
    Ok(Some(CommentPostIntent {
        target_url: pull_request.comments_url.clone(),
        body,
    }))
}

/// Decide stale reminders for every open pull request against the
/// repository's base branch, one pull request at a time.
///
/// The listing follows `next` links until every page is read. A transport
/// failure on a single pull request is logged and skipped. Failing to list
/// the pull requests, on any page, fails the repository.
pub async fn evaluate_repository(
    client: &dyn HttpClient,
    api_url: &str,
    repository: &str,
    settings: &RepositorySettings,
    bot_login: &str,
    now: DateTime<Utc>,
) -> Result<Vec<CommentPostIntent>, PolicyError> {
    settings.stale_template(repository)?;

    let url = pull_request_list_url(api_url, repository, &settings.base_branch)?;
    let pull_requests: Vec<PullRequest> =
        fetch_all_pages(client, &url, &settings.headers).await?;
    debug!(count = pull_requests.len(), "listed open pull requests");

    let mut intents = Vec::new();
    for pull_request in pull_requests
        .iter()
        .filter(|pr| pr.state == PullRequestState::Open && pr.base.branch == settings.base_branch)
    {
        match evaluate_pull_request(client, pull_request, settings, repository, bot_login, now).await {
            Ok(Some(intent)) => intents.push(intent),
            Ok(None) => {}
            Err(PolicyError::Transport(err)) => {
                error!(pr = pull_request.number, status = ?err.status(), error = %err, "skipping pull request");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(intents)
}

/// Bump stale pull requests in every configured repository.
///
/// Repositories run sequentially in name order. A transport failure only
/// costs the repository it happened in; configuration errors end the run.
pub async fn stale_pull_request_job(
    client: &dyn HttpClient,
    api_url: &str,
    repositories: &BTreeMap<String, RepositorySettings>,
    bot_login: &str,
    clock: &dyn Clock,
    delivery: Delivery,
) -> Result<JobSummary, PolicyError> {
    info!(repositories = repositories.len(), ?delivery, "initiating stale pull request job");
    let mut summary = JobSummary::default();

    for (repository, settings) in repositories {
        let span = info_span!("repository", name = %repository);
        let outcome = async {
            let intents =
                evaluate_repository(client, api_url, repository, settings, bot_login, clock.now())
                    .await?;
            if delivery == Delivery::Post {
                post_intents(client, &settings.headers, &intents).await?;
            }
            Ok::<_, PolicyError>(intents)
        }
        .instrument(span)
        .await;

        match outcome {
            Ok(intents) => {
                info!(repository = %repository, reminders = intents.len(), "repository done");
                summary.intents.extend(intents);
            }
            Err(PolicyError::Transport(err)) => {
                error!(repository = %repository, status = ?err.status(), error = %err, "repository failed");
                summary.failed_repositories.push(repository.clone());
            }
            Err(err) => return Err(err),
        }
    }

    Ok(summary)
}
