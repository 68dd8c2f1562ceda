use starscout::Progress;

/// Logging reporter using tracing for structured output.
///
/// Stage milestones, retries, and stalls are already logged by the library;
/// this adds the per-page and per-owner detail.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: Progress) {
        match event {
            Progress::FetchedPage {
                query,
                page,
                count,
                total_so_far,
                expected_pages,
            } => {
                tracing::info!(query = %query, page, count, total_so_far, expected_pages = ?expected_pages, "Fetched page");
            }

            Progress::SliceComplete {
                query,
                count,
                unique_total,
            } => {
                tracing::info!(query = %query, count, unique_total, "Star range complete");
            }

            Progress::NarrowingRange { max_stars } => {
                tracing::info!(max_stars, "Narrowing star range");
            }

            Progress::ResolvingOwner { repo, owner } => {
                tracing::debug!(repo = %repo, owner = %owner, "Resolving owner");
            }

            Progress::OwnerResolved {
                repo,
                owner,
                website,
            } => match website {
                Some(website) => {
                    tracing::info!(repo = %repo, owner = %owner, website = %website, "Owner website");
                }
                None => {
                    tracing::info!(repo = %repo, owner = %owner, "Owner has no website");
                }
            },

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
