//! GitHub REST client: request construction, status handling, Link parsing.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::error::{GitHubError, short_error_message};
use super::types::{Owner, OwnerProfile};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::progress::ProgressCallback;
use crate::retry::{RetryConfig, with_retry};

/// Public GitHub API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub's versioned JSON media type.
pub const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";

/// REST API version pinned in every request.
pub const API_VERSION: &str = "2022-11-28";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("starscout/", env!("CARGO_PKG_VERSION"));

/// Pagination information extracted from GitHub's Link header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPagination {
    /// Absolute URL of the next page (from rel="next").
    pub next_url: Option<String>,
    /// The last page number (from rel="last").
    pub last_page: Option<u32>,
}

impl LinkPagination {
    /// Returns the total number of pages if known.
    pub fn total_pages(&self) -> Option<u32> {
        self.last_page
    }
}

/// Parse the Link header to extract pagination info.
///
/// GitHub Link headers look like:
/// `<https://api.github.com/search/repositories?q=stars%3A%3E%3D1&page=2>; rel="next", <...&page=10>; rel="last"`
pub fn parse_link_header(link_header: &str) -> LinkPagination {
    let mut info = LinkPagination::default();

    for part in link_header.split(',') {
        let part = part.trim();

        let mut url = None;
        let mut rel = None;

        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(rel_value) = segment.strip_prefix("rel=") {
                rel = Some(rel_value.trim_matches('"'));
            }
        }

        if let (Some(url), Some(rel_type)) = (url, rel) {
            match rel_type {
                "next" => info.next_url = Some(url.to_string()),
                "last" => info.last_page = extract_page_from_url(url),
                _ => {}
            }
        }
    }

    info
}

/// Extract the page parameter from a URL.
fn extract_page_from_url(url: &str) -> Option<u32> {
    let query_start = url.find('?')?;
    let query = &url[query_start + 1..];

    for param in query.split('&') {
        if let Some(value) = param.strip_prefix("page=") {
            return value.parse().ok();
        }
    }

    None
}

/// GitHub API client.
///
/// Holds the transport, API root, and optional token; every request gets the
/// same header set. Cheap to clone.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client backed by reqwest with the given per-request timeout.
    pub fn new(token: Option<String>, timeout: Duration) -> Result<Self, GitHubError> {
        let transport = ReqwestTransport::with_timeout(timeout)?;
        Ok(Self::with_transport(Arc::new(transport), token))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(transport: Arc<dyn HttpTransport>, token: Option<String>) -> Self {
        Self {
            transport,
            api_url: DEFAULT_API_URL.to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Point the client at a different API root (GitHub Enterprise, tests).
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Absolute URL for an API path such as `/users/octocat`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// Profile endpoint for a repository owner.
    ///
    /// Organizations live under `/orgs/{login}`; every other kind is looked up
    /// under `/users/{login}`.
    pub fn owner_url(&self, owner: &Owner) -> String {
        if owner.kind.is_organization() {
            self.endpoint(&format!("orgs/{}", owner.login))
        } else {
            self.endpoint(&format!("users/{}", owner.login))
        }
    }

    fn request(&self, url: &str) -> HttpRequest {
        let request = HttpRequest::get(url)
            .with_header("Accept", ACCEPT_GITHUB_JSON)
            .with_header("X-GitHub-Api-Version", API_VERSION)
            .with_header("User-Agent", USER_AGENT);

        match &self.token {
            Some(token) => request.with_header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    /// Send a GET and fail on any non-2xx status.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, GitHubError> {
        tracing::debug!(url, "GET");
        let response = self.transport.send(self.request(url)).await?;

        if !response.is_success() {
            tracing::debug!(
                url,
                status = response.status,
                remaining = ?response.header("x-ratelimit-remaining"),
                "GitHub returned an error status"
            );
            return Err(GitHubError::from_status(
                response.status,
                url,
                &response.body,
            ));
        }

        Ok(response)
    }

    /// GET a URL and decode its JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GitHubError> {
        let response = self.get(url).await?;
        decode_body(url, &response)
    }

    /// GET a URL with bounded retries on connection failures and timeouts.
    ///
    /// Error statuses and decode failures end the attempt loop immediately.
    pub async fn get_json_with_retry<T: DeserializeOwned>(
        &self,
        url: &str,
        retry: &RetryConfig,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<T, GitHubError> {
        let result = with_retry(
            || self.get_json::<T>(url),
            GitHubError::is_transient,
            retry,
            url,
            on_progress,
        )
        .await;

        if let Err(e) = &result {
            tracing::debug!(url, error = %short_error_message(e), "Giving up");
        }
        result
    }

    /// Fetch the public profile of a repository owner.
    pub async fn get_owner_profile(
        &self,
        owner: &Owner,
        retry: &RetryConfig,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<OwnerProfile, GitHubError> {
        let url = self.owner_url(owner);
        self.get_json_with_retry(&url, retry, on_progress).await
    }
}

pub(crate) fn decode_body<T: DeserializeOwned>(
    url: &str,
    response: &HttpResponse,
) -> Result<T, GitHubError> {
    serde_json::from_slice(&response.body).map_err(|source| GitHubError::Decode {
        url: url.to_string(),
        source,
    })
}
