use reqwest::header::HeaderMap;
use tracing::{debug, instrument};

use crate::github::pagination::{parse_last_page, with_page};
use crate::github::{check_status, Comment, GitHubError, HttpClient};

/// Fetch the most recent page of a comment thread.
///
/// The first request only serves to read the `Link` header; the second
/// fetches the `last` page it names. Threads that fit on one page carry no
/// `last` relation, and the first response is returned as-is.
#[instrument(skip(client, headers))]
pub async fn fetch_last_comment_page(
    client: &dyn HttpClient,
    comments_url: &str,
    headers: &HeaderMap,
) -> Result<Vec<Comment>, GitHubError> {
    let first = check_status(client.get(comments_url, headers).await?)?;

    let Some(last_page) = first.link.as_deref().and_then(parse_last_page) else {
        debug!("comment thread fits on one page");
        return first.json();
    };

    debug!(last_page, "fetching last comment page");
    let last_url = with_page(comments_url, last_page)?;
    check_status(client.get(&last_url, headers).await?)?.json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::testing::FakeClient;

    const COMMENTS: &str = "https://api.github.com/repos/org/repo/issues/3/comments";

    fn comment_json(author: &str, body: &str) -> serde_json::Value {
        serde_json::json!({
            "user": { "login": author },
            "body": body,
            "created_at": "2024-05-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_single_page_uses_first_response() {
        let client = FakeClient::new().with_json(
            COMMENTS,
            serde_json::json!([comment_json("alice", "one"), comment_json("bob", "two")]),
        );

        let comments = fetch_last_comment_page(&client, COMMENTS, &HeaderMap::new())
            .await
            .unwrap();

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[1].body, "two");
        assert_eq!(client.gets(), vec![COMMENTS.to_string()]);
    }

    #[tokio::test]
    async fn test_multi_page_fetches_last_page() {
        let last_url = format!("{COMMENTS}?page=3");
        let link = format!("<{COMMENTS}?page=2>; rel=\"next\", <{last_url}>; rel=\"last\"");
        let client = FakeClient::new()
            .with_response(
                COMMENTS,
                200,
                serde_json::json!([comment_json("alice", "oldest")]),
                Some(link),
            )
            .with_json(&last_url, serde_json::json!([comment_json("carol", "newest")]));

        let comments = fetch_last_comment_page(&client, COMMENTS, &HeaderMap::new())
            .await
            .unwrap();

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author(), Some("carol"));
        assert_eq!(client.gets(), vec![COMMENTS.to_string(), last_url]);
    }

    #[tokio::test]
    async fn test_first_request_failure_carries_status() {
        let client = FakeClient::new().with_response(
            COMMENTS,
            403,
            serde_json::json!({ "message": "Forbidden" }),
            None,
        );

        let err = fetch_last_comment_page(&client, COMMENTS, &HeaderMap::new())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn test_last_page_failure_carries_status() {
        let link = format!("<{COMMENTS}?page=2>; rel=\"last\"");
        let client = FakeClient::new().with_response(COMMENTS, 200, serde_json::json!([]), Some(link));

        let err = fetch_last_comment_page(&client, COMMENTS, &HeaderMap::new())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
    }
}
