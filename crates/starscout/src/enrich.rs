//! Owner website enrichment.
//!
//! For each repository the owner's profile is fetched (organization or user
//! endpoint depending on the owner kind) and its website extracted. A failed
//! lookup records `website: null` and the loop moves on; a fixed pause after
//! every repository keeps the request rate polite.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::github::{GitHubClient, GitHubError, Owner, OwnerType, Repository, short_error_message};
use crate::progress::{Progress, ProgressCallback, emit};
use crate::retry::RetryConfig;

/// Pause after each repository.
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(500);

/// Website of one repository's owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerWebsite {
    pub repo_full_name: String,
    pub owner: String,
    pub owner_type: OwnerType,
    /// `None` when the profile lookup failed or the profile has no URL at all.
    pub website: Option<String>,
}

/// Settings for the enrichment loop.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichOptions {
    /// Retry policy for each profile request.
    pub retry: RetryConfig,
    /// Sleep after each repository, successful or not.
    pub pause: Duration,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            pause: DEFAULT_PAUSE,
        }
    }
}

/// Outcome of an enrichment run.
#[derive(Debug, Clone, Default)]
pub struct EnrichReport {
    /// One record per processed repository, in input order.
    pub records: Vec<OwnerWebsite>,
    /// Owners whose profile was fetched.
    pub resolved: usize,
    /// Owners whose lookup failed.
    pub failed: usize,
    /// A stop was requested before every repository was processed.
    pub interrupted: bool,
}

/// Resolve the website of a repository owner.
///
/// `Ok(None)` means the profile was fetched but lists no URL; `Err` means the
/// profile could not be fetched.
pub async fn lookup_website(
    client: &GitHubClient,
    owner: &Owner,
    retry: &RetryConfig,
    on_progress: Option<&ProgressCallback>,
) -> Result<Option<String>, GitHubError> {
    let profile = client.get_owner_profile(owner, retry, on_progress).await?;
    Ok(profile.website())
}

/// Resolve the owner website of every repository, in order.
pub async fn enrich_owners(
    client: &GitHubClient,
    repos: &[Repository],
    options: &EnrichOptions,
    on_progress: Option<&ProgressCallback>,
) -> EnrichReport {
    enrich_owners_until(client, repos, options, on_progress, || false).await
}

/// Like [`enrich_owners`], checking `should_stop` before each repository.
pub async fn enrich_owners_until(
    client: &GitHubClient,
    repos: &[Repository],
    options: &EnrichOptions,
    on_progress: Option<&ProgressCallback>,
    should_stop: impl Fn() -> bool,
) -> EnrichReport {
    let mut report = EnrichReport {
        records: Vec::with_capacity(repos.len()),
        ..EnrichReport::default()
    };

    tracing::info!(total = repos.len(), "Resolving owner websites");
    emit(on_progress, Progress::EnrichingOwners { total: repos.len() });

    for repo in repos {
        if should_stop() {
            tracing::warn!(
                processed = report.records.len(),
                total = repos.len(),
                "Stop requested, ending enrichment early"
            );
            report.interrupted = true;
            break;
        }

        let owner = &repo.owner;
        emit(
            on_progress,
            Progress::ResolvingOwner {
                repo: repo.full_name.clone(),
                owner: owner.login.clone(),
            },
        );

        let website = match lookup_website(client, owner, &options.retry, on_progress).await {
            Ok(website) => {
                report.resolved += 1;
                tracing::debug!(repo = %repo.full_name, owner = %owner.login, website = ?website, "Resolved owner");
                emit(
                    on_progress,
                    Progress::OwnerResolved {
                        repo: repo.full_name.clone(),
                        owner: owner.login.clone(),
                        website: website.clone(),
                    },
                );
                website
            }
            Err(e) => {
                report.failed += 1;
                let message = short_error_message(&e);
                tracing::warn!(repo = %repo.full_name, owner = %owner.login, error = %message, "Failed to fetch owner");
                emit(
                    on_progress,
                    Progress::OwnerFailed {
                        repo: repo.full_name.clone(),
                        owner: owner.login.clone(),
                        error: message,
                    },
                );
                None
            }
        };

        report.records.push(OwnerWebsite {
            repo_full_name: repo.full_name.clone(),
            owner: owner.login.clone(),
            owner_type: owner.kind.clone(),
            website,
        });

        tokio::time::sleep(options.pause).await;
    }

    tracing::info!(
        total = report.records.len(),
        resolved = report.resolved,
        failed = report.failed,
        "Owner enrichment complete"
    );
    emit(
        on_progress,
        Progress::EnrichComplete {
            total: report.records.len(),
            resolved: report.resolved,
            failed: report.failed,
        },
    );

    report
}
