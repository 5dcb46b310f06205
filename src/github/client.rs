use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, LINK};
use tracing::{debug, instrument};

use super::{GitHubError, HttpClient, HttpResponse};

const USER_AGENT: &str = "concierge";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, GitHubError> {
        let inner = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { inner })
    }

    async fn read_response(response: reqwest::Response) -> Result<HttpResponse, GitHubError> {
        let url = response.url().to_string();
        let status = response.status().as_u16();
        let link = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);

        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
        };
        debug!(%url, status, paginated = link.is_some(), "received response");

        Ok(HttpResponse {
            url,
            status,
            body,
            link,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    #[instrument(skip(self, headers))]
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<HttpResponse, GitHubError> {
        let response = self
            .inner
            .get(url)
            .headers(headers.clone())
            .send()
            .await?;
        Self::read_response(response).await
    }

    #[instrument(skip(self, headers, body))]
    async fn post(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, GitHubError> {
        let response = self
            .inner
            .post(url)
            .headers(headers.clone())
            .json(body)
            .send()
            .await?;
        Self::read_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::check_status;
    use reqwest::header::{HeaderValue, AUTHORIZATION};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn auth_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("token abc"));
        headers
    }

    #[tokio::test]
    async fn test_get_returns_body_and_link_header() {
        let server = MockServer::start().await;
        let link = format!(
            "<{}/comments?page=3>; rel=\"last\"",
            server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/comments"))
            .and(header("authorization", "token abc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{ "id": 1 }]))
                    .insert_header("Link", link.as_str()),
            )
            .mount(&server)
            .await;

        let client = ReqwestClient::new().unwrap();
        let response = client
            .get(&format!("{}/comments", server.uri()), &auth_headers())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, serde_json::json!([{ "id": 1 }]));
        assert_eq!(response.link.as_deref(), Some(link.as_str()));
    }

    #[tokio::test]
    async fn test_get_reports_error_status_without_failing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({ "message": "Not Found" })),
            )
            .mount(&server)
            .await;

        let client = ReqwestClient::new().unwrap();
        let response = client
            .get(&format!("{}/missing?page=2", server.uri()), &HeaderMap::new())
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert!(response.link.is_none());
        let err = check_status(response).unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/issues/1/comments"))
            .and(body_json(serde_json::json!({ "body": "hello" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": 99 })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ReqwestClient::new().unwrap();
        let response = client
            .post(
                &format!("{}/issues/1/comments", server.uri()),
                &auth_headers(),
                &serde_json::json!({ "body": "hello" }),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body["id"], 99);
    }

    #[tokio::test]
    async fn test_non_json_body_is_kept_as_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/plain"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let client = ReqwestClient::new().unwrap();
        let response = client
            .get(&format!("{}/plain", server.uri()), &HeaderMap::new())
            .await
            .unwrap();

        assert_eq!(response.status, 502);
        assert_eq!(response.body, serde_json::json!("Bad Gateway"));
    }
}
