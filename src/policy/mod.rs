pub mod comments;
pub mod message;
pub mod opened;
pub mod paths;
pub mod stale;
pub mod staleness;
pub mod stop;

pub use opened::opened_pull_request_handler;
pub use stale::{stale_pull_request_job, Delivery, JobSummary};
pub use staleness::{Clock, SystemClock};

use reqwest::header::HeaderMap;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::ConfigError;
use crate::github::{check_status, GitHubError, HttpClient};

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Transport(#[from] GitHubError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// A decided, not yet executed, instruction to post `body` as a comment at
/// `target_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentPostIntent {
    pub target_url: String,
    pub body: String,
}

/// Post every intent in order, stopping at the first failure.
#[instrument(skip_all, fields(count = intents.len()))]
pub async fn post_intents(
    client: &dyn HttpClient,
    headers: &HeaderMap,
    intents: &[CommentPostIntent],
) -> Result<(), GitHubError> {
    for intent in intents {
        let body = serde_json::json!({ "body": intent.body });
        check_status(client.post(&intent.target_url, headers, &body).await?)?;
        info!(target_url = %intent.target_url, "posted comment");
    }
    Ok(())
}
