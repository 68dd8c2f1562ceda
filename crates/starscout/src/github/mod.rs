//! GitHub REST API access.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`types`] - Repository, owner, and profile records
//! - [`client`] - Client creation, headers, status handling, Link parsing
//! - [`pagination`] - Walking one search query through its pages
//!
//! ```ignore
//! use starscout::github::{GitHubClient, DEFAULT_TIMEOUT};
//!
//! let client = GitHubClient::new(Some(token), DEFAULT_TIMEOUT)?;
//! let repos = client.search_repositories("stars:>=20000", 100, None).await?;
//! ```

mod client;
mod error;
mod pagination;
mod types;

pub use error::{GitHubError, short_error_message};

pub use types::{Owner, OwnerProfile, OwnerType, Repository, SearchPage};

pub use client::{
    ACCEPT_GITHUB_JSON, API_VERSION, DEFAULT_API_URL, DEFAULT_TIMEOUT, GitHubClient,
    LinkPagination, parse_link_header,
};

pub use pagination::{MAX_PER_PAGE, SEARCH_RESULT_CAP, SearchOptions};
