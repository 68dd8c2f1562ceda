//! Starscout - collect popular GitHub repositories and their owners' websites.
//!
//! The pipeline has two stages:
//!
//! 1. [`range::fetch_all`] gathers every repository at or above a star
//!    threshold, narrowing the star range to get past the search API's
//!    1000-result window.
//! 2. [`enrich::enrich_owners`] looks up each repository owner's profile and
//!    records its website.
//!
//! Both stages report through an optional [`ProgressCallback`] and leave
//! persistence to [`store`].
//!
//! # Example
//!
//! ```ignore
//! use starscout::github::{GitHubClient, DEFAULT_TIMEOUT};
//! use starscout::{EnrichOptions, SearchOptions, enrich_owners, fetch_all};
//!
//! let client = GitHubClient::new(Some(token), DEFAULT_TIMEOUT)?;
//! let report = fetch_all(&client, 20_000, &SearchOptions::default(), None).await?;
//! let repos = report.repositories;
//! let websites = enrich_owners(&client, &repos, &EnrichOptions::default(), None).await;
//! ```

pub mod enrich;
pub mod github;
pub mod http;
pub mod progress;
pub mod range;
pub mod retry;
pub mod store;

pub use enrich::{EnrichOptions, EnrichReport, OwnerWebsite, enrich_owners, lookup_website};
pub use github::{GitHubClient, GitHubError, Owner, OwnerType, Repository, SearchOptions};
pub use progress::{Progress, ProgressCallback};
pub use range::{DEFAULT_MIN_STARS, FetchReport, RepositorySet, StarRange, fetch_all};
pub use retry::RetryConfig;
pub use store::StoreError;
