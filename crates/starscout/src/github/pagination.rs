//! Repository search pagination.
//!
//! A single search query is walked page by page through the `rel="next"`
//! links GitHub returns. GitHub stops handing out next links once the
//! 1000-result window is exhausted, so one walk never yields more than that.

use url::Url;

use super::client::{GitHubClient, decode_body, parse_link_header};
use super::error::GitHubError;
use super::types::{Repository, SearchPage};
use crate::progress::{Progress, ProgressCallback, emit};

/// Largest page size the search API accepts.
pub const MAX_PER_PAGE: usize = 100;

/// Most results the search API returns for any one query.
pub const SEARCH_RESULT_CAP: usize = 1000;

/// Page size and result window of the search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Items requested per page.
    pub per_page: usize,
    /// Items the API returns per query before it stops paginating.
    pub result_cap: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            per_page: MAX_PER_PAGE,
            result_cap: SEARCH_RESULT_CAP,
        }
    }
}

impl SearchOptions {
    #[must_use]
    pub fn new(per_page: usize, result_cap: usize) -> Self {
        Self {
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            result_cap: result_cap.max(1),
        }
    }
}

impl GitHubClient {
    /// URL of the first page of a star-sorted repository search.
    pub fn search_url(&self, query: &str, per_page: usize) -> Result<String, GitHubError> {
        let per_page = per_page.to_string();
        let url = Url::parse_with_params(
            &self.endpoint("search/repositories"),
            &[
                ("q", query),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ],
        )?;
        Ok(url.into())
    }

    /// Collect every result of one search query, in the order GitHub returns them.
    ///
    /// Stops when a page comes back short or no next link is offered. Any
    /// error status or transport failure aborts the walk.
    pub async fn search_repositories(
        &self,
        query: &str,
        per_page: usize,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Repository>, GitHubError> {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let mut url = self.search_url(query, per_page)?;
        let mut items: Vec<Repository> = Vec::new();
        let mut page = 1u32;

        loop {
            let response = self.get(&url).await?;
            let body: SearchPage = decode_body(&url, &response)?;
            let count = body.items.len();
            items.extend(body.items);

            let links = response
                .header("link")
                .map(parse_link_header)
                .unwrap_or_default();

            tracing::debug!(query, page, count, total = items.len(), "Fetched search page");
            emit(
                on_progress,
                Progress::FetchedPage {
                    query: query.to_string(),
                    page,
                    count,
                    total_so_far: items.len(),
                    expected_pages: links.total_pages(),
                },
            );

            if count < per_page {
                break;
            }

            match links.next_url {
                Some(next) => {
                    url = next;
                    page += 1;
                }
                None => break,
            }
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::http::{HttpError, HttpResponse, MockTransport};
    use crate::progress::testing::recorder;

    const API: &str = "https://api.test";

    fn client(mock: &MockTransport) -> GitHubClient {
        GitHubClient::with_transport(Arc::new(mock.clone()), Some("t".into())).with_api_url(API)
    }

    fn repo_json(n: u64, stars: u64) -> serde_json::Value {
        json!({
            "full_name": format!("owner{n}/repo{n}"),
            "stargazers_count": stars,
            "owner": {"login": format!("owner{n}"), "type": "User"}
        })
    }

    fn page(items: Vec<serde_json::Value>, next: Option<&str>) -> HttpResponse {
        let mut headers = Vec::new();
        if let Some(next) = next {
            headers.push(("Link".to_string(), format!("<{next}>; rel=\"next\"")));
        }
        HttpResponse {
            status: 200,
            headers,
            body: serde_json::to_vec(&json!({ "items": items })).unwrap(),
        }
    }

    #[test]
    fn search_url_encodes_query_and_sort() {
        let mock = MockTransport::new();
        let url = client(&mock).search_url("stars:>=20000", 100).unwrap();
        assert_eq!(
            url,
            "https://api.test/search/repositories?q=stars%3A%3E%3D20000&sort=stars&order=desc&per_page=100"
        );

        let url = client(&mock).search_url("stars:5..10", 30).unwrap();
        assert!(url.contains("q=stars%3A5..10"), "{url}");
        assert!(url.ends_with("per_page=30"), "{url}");
    }

    #[test]
    fn search_options_clamp_to_api_limits() {
        let options = SearchOptions::new(500, 0);
        assert_eq!(options.per_page, 100);
        assert_eq!(options.result_cap, 1);
        assert_eq!(SearchOptions::default(), SearchOptions::new(100, 1000));
    }

    #[tokio::test]
    async fn walks_every_page_in_order() {
        let mock = MockTransport::new();
        let client = client(&mock);
        let first = client.search_url("stars:>=1", 2).unwrap();
        let second = format!("{API}/search/repositories?page=2");
        let third = format!("{API}/search/repositories?page=3");

        mock.push_response(&first, page(vec![repo_json(1, 50), repo_json(2, 40)], Some(&second)));
        mock.push_response(&second, page(vec![repo_json(3, 30), repo_json(4, 20)], Some(&third)));
        mock.push_response(&third, page(vec![repo_json(5, 10)], None));

        let (callback, events) = recorder();
        let repos = client
            .search_repositories("stars:>=1", 2, Some(&callback))
            .await
            .unwrap();

        let names: Vec<&str> = repos.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "owner1/repo1",
                "owner2/repo2",
                "owner3/repo3",
                "owner4/repo4",
                "owner5/repo5"
            ]
        );
        assert_eq!(mock.requests().len(), 3);

        let pages = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, Progress::FetchedPage { .. }))
            .count();
        assert_eq!(pages, 3);
    }

    #[tokio::test]
    async fn short_first_page_makes_a_single_request() {
        let mock = MockTransport::new();
        let client = client(&mock);
        let first = client.search_url("stars:>=1", 100).unwrap();
        // A next link is present but the short page already signals the end.
        mock.push_response(
            &first,
            page(vec![repo_json(1, 5)], Some("https://api.test/unused")),
        );

        let repos = client.search_repositories("stars:>=1", 100, None).await.unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn full_page_without_next_link_ends_the_walk() {
        let mock = MockTransport::new();
        let client = client(&mock);
        let first = client.search_url("stars:>=1", 2).unwrap();
        mock.push_response(&first, page(vec![repo_json(1, 5), repo_json(2, 4)], None));

        let repos = client.search_repositories("stars:>=1", 2, None).await.unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let mock = MockTransport::new();
        let client = client(&mock);
        let first = client.search_url("stars:>=999999999", 100).unwrap();
        mock.push_json(&first, 200, &json!({"total_count": 0, "items": []}));

        let repos = client
            .search_repositories("stars:>=999999999", 100, None)
            .await
            .unwrap();
        assert!(repos.is_empty());
    }

    #[tokio::test]
    async fn error_status_mid_walk_is_fatal() {
        let mock = MockTransport::new();
        let client = client(&mock);
        let first = client.search_url("stars:>=1", 1).unwrap();
        let second = format!("{API}/search/repositories?page=2");
        mock.push_response(&first, page(vec![repo_json(1, 9)], Some(&second)));
        mock.push_json(&second, 403, &json!({"message": "API rate limit exceeded"}));

        let err = client
            .search_repositories("stars:>=1", 1, None)
            .await
            .expect_err("403 aborts the walk");
        assert_eq!(err.status(), Some(403));
        assert!(err.to_string().contains("rate limit"));
    }

    #[tokio::test]
    async fn transport_failure_is_fatal_without_retry() {
        let mock = MockTransport::new();
        let client = client(&mock);
        let first = client.search_url("stars:>=1", 100).unwrap();
        mock.push_error(&first, HttpError::Connect("refused".into()));
        mock.push_response(&first, page(vec![], None));

        let err = client
            .search_repositories("stars:>=1", 100, None)
            .await
            .expect_err("connect error aborts");
        assert!(err.is_transient());
        assert_eq!(mock.requests().len(), 1);
    }
}
