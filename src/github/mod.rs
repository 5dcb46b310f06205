pub mod client;
pub mod pagination;
pub mod pulls;
pub mod types;

pub use client::ReqwestClient;
pub use types::{ChangedFile, Comment, PullRequest};

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl GitHubError {
    /// HTTP status of the failed call, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::Status { status, .. } => Some(*status),
            GitHubError::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// What the policies need to know about an HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub url: String,
    pub status: u16,
    pub body: serde_json::Value,
    /// Raw `Link` header, if the endpoint is paginated
    pub link: Option<String>,
}

impl HttpResponse {
    /// Decode the JSON body into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GitHubError> {
        T::deserialize(&self.body).map_err(|source| GitHubError::Decode {
            url: self.url.clone(),
            source,
        })
    }
}

/// Fail with [`GitHubError::Status`] unless the response is 2xx.
pub fn check_status(response: HttpResponse) -> Result<HttpResponse, GitHubError> {
    if (200..300).contains(&response.status) {
        Ok(response)
    } else {
        Err(GitHubError::Status {
            status: response.status,
            url: response.url,
        })
    }
}

/// HTTP capability the policies run against.
///
/// Implementations return every response, successful or not; callers decide
/// with [`check_status`]. Retries and timeouts belong to the implementation.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<HttpResponse, GitHubError>;

    async fn post(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, GitHubError>;
}

#[cfg(test)]
pub mod testing {
    //! In-memory [`HttpClient`] that serves canned responses and records posts.

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeClient {
        responses: HashMap<String, HttpResponse>,
        gets: Mutex<Vec<String>>,
        posts: Mutex<Vec<(String, serde_json::Value)>>,
    }

    impl FakeClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve `body` with status 200 for GETs of `url`.
        pub fn with_json(self, url: &str, body: serde_json::Value) -> Self {
            self.with_response(url, 200, body, None)
        }

        pub fn with_response(
            mut self,
            url: &str,
            status: u16,
            body: serde_json::Value,
            link: Option<String>,
        ) -> Self {
            self.responses.insert(
                url.to_string(),
                HttpResponse {
                    url: url.to_string(),
                    status,
                    body,
                    link,
                },
            );
            self
        }

        pub fn gets(&self) -> Vec<String> {
            self.gets.lock().unwrap().clone()
        }

        pub fn posts(&self) -> Vec<(String, serde_json::Value)> {
            self.posts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClient for FakeClient {
        async fn get(&self, url: &str, _headers: &HeaderMap) -> Result<HttpResponse, GitHubError> {
            self.gets.lock().unwrap().push(url.to_string());
            Ok(self.responses.get(url).cloned().unwrap_or(HttpResponse {
                url: url.to_string(),
                status: 404,
                body: serde_json::json!({ "message": "Not Found" }),
                link: None,
            }))
        }

        async fn post(
            &self,
            url: &str,
            _headers: &HeaderMap,
            body: &serde_json::Value,
        ) -> Result<HttpResponse, GitHubError> {
            self.posts
                .lock()
                .unwrap()
                .push((url.to_string(), body.clone()));
            Ok(HttpResponse {
                url: url.to_string(),
                status: 201,
                body: serde_json::json!({}),
                link: None,
            })
        }
    }
}
