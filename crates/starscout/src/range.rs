//! Fetching every repository above a star threshold.
//!
//! The search API returns at most [`SEARCH_RESULT_CAP`](crate::github::SEARCH_RESULT_CAP)
//! results per query. To get past it the star range is narrowed: whenever a
//! slice comes back full, the next query's upper bound becomes the lowest star
//! count seen. The bound is inclusive, so repositories tied at the boundary
//! show up in two slices and collapse into one entry in the [`RepositorySet`].

use std::collections::HashMap;

use crate::github::{GitHubClient, GitHubError, Repository, SearchOptions};
use crate::progress::{Progress, ProgressCallback, emit};

/// Star threshold used when none is configured.
pub const DEFAULT_MIN_STARS: u64 = 20_000;

/// An inclusive star-count range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarRange {
    pub min: u64,
    pub max: Option<u64>,
}

impl StarRange {
    /// `stars >= min`.
    #[must_use]
    pub fn at_least(min: u64) -> Self {
        Self { min, max: None }
    }

    /// `min <= stars <= max`.
    #[must_use]
    pub fn between(min: u64, max: u64) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// Search qualifier, e.g. `stars:>=20000` or `stars:20000..25000`.
    #[must_use]
    pub fn query(&self) -> String {
        match self.max {
            None => format!("stars:>={}", self.min),
            Some(max) => format!("stars:{}..{}", self.min, max),
        }
    }
}

/// Repositories keyed by `full_name`.
///
/// Inserting an existing name replaces the stored record in place (last write
/// wins) and keeps its original position, so iteration order is the order in
/// which names were first seen.
#[derive(Debug, Clone, Default)]
pub struct RepositorySet {
    entries: Vec<Repository>,
    index: HashMap<String, usize>,
}

impl RepositorySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace a repository. Returns `true` if the name was new.
    pub fn insert(&mut self, repo: Repository) -> bool {
        match self.index.get(&repo.full_name) {
            Some(&pos) => {
                self.entries[pos] = repo;
                false
            }
            None => {
                self.index.insert(repo.full_name.clone(), self.entries.len());
                self.entries.push(repo);
                true
            }
        }
    }

    /// Consume the set, most-starred first. Ties keep first-seen order.
    #[must_use]
    pub fn into_sorted_vec(self) -> Vec<Repository> {
        let mut repos = self.entries;
        repos.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
        repos
    }
}

impl Extend<Repository> for RepositorySet {
    fn extend<I: IntoIterator<Item = Repository>>(&mut self, iter: I) {
        for repo in iter {
            self.insert(repo);
        }
    }
}

impl FromIterator<Repository> for RepositorySet {
    fn from_iter<I: IntoIterator<Item = Repository>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// Outcome of a range fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Distinct repositories, most-starred first.
    pub repositories: Vec<Repository>,
    /// Number of star ranges queried.
    pub slices: usize,
    /// More repositories share one star count than a single query can return;
    /// the ones beyond the cap are missing.
    pub stalled: bool,
    /// A stop was requested before narrowing finished.
    pub interrupted: bool,
}

/// Fetch every repository with at least `min_stars` stars.
pub async fn fetch_all(
    client: &GitHubClient,
    min_stars: u64,
    options: &SearchOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<FetchReport, GitHubError> {
    fetch_all_until(client, min_stars, options, on_progress, || false).await
}

/// Like [`fetch_all`], checking `should_stop` before each slice.
pub async fn fetch_all_until(
    client: &GitHubClient,
    min_stars: u64,
    options: &SearchOptions,
    on_progress: Option<&ProgressCallback>,
    should_stop: impl Fn() -> bool,
) -> Result<FetchReport, GitHubError> {
    let mut set = RepositorySet::new();
    let mut range = StarRange::at_least(min_stars);
    let mut report = FetchReport::default();

    loop {
        if should_stop() {
            tracing::warn!(slices = report.slices, "Stop requested, abandoning range fetch");
            report.interrupted = true;
            break;
        }

        report.slices += 1;
        let query = range.query();
        tracing::info!(query = %query, slice = report.slices, "Fetching star range");
        emit(
            on_progress,
            Progress::SearchingRange {
                query: query.clone(),
                slice: report.slices,
            },
        );

        let items = client
            .search_repositories(&query, options.per_page, on_progress)
            .await?;

        let Some(lowest) = items.last().map(|r| r.stargazers_count) else {
            break;
        };
        let slice_len = items.len();

        for repo in items {
            if repo.stargazers_count >= min_stars {
                set.insert(repo);
            } else {
                tracing::debug!(
                    repo = %repo.full_name,
                    stars = repo.stargazers_count,
                    "Dropping repository below threshold"
                );
            }
        }

        emit(
            on_progress,
            Progress::SliceComplete {
                query,
                count: slice_len,
                unique_total: set.len(),
            },
        );

        if slice_len < options.result_cap {
            break;
        }

        if lowest < min_stars {
            tracing::debug!(
                lowest,
                min_stars,
                "Slice reached below the threshold, nothing left to narrow"
            );
            break;
        }

        if range.max.is_some_and(|max| lowest >= max) {
            tracing::warn!(
                stars = lowest,
                cap = options.result_cap,
                "Star range cannot be narrowed further; repositories past the cap are skipped"
            );
            emit(
                on_progress,
                Progress::RangeStalled {
                    stars: lowest,
                    result_cap: options.result_cap,
                },
            );
            report.stalled = true;
            break;
        }

        tracing::debug!(max_stars = lowest, "Slice hit the result cap, narrowing");
        emit(on_progress, Progress::NarrowingRange { max_stars: lowest });
        range = StarRange::between(min_stars, lowest);
    }

    report.repositories = set.into_sorted_vec();

    tracing::info!(
        total = report.repositories.len(),
        slices = report.slices,
        "Range fetch complete"
    );
    emit(
        on_progress,
        Progress::FetchComplete {
            total: report.repositories.len(),
            slices: report.slices,
        },
    );

    Ok(report)
}
