//! Progress reporting types for the fetch and enrichment stages.
//!
//! The library never prints. Callers pass an optional [`ProgressCallback`] and
//! render events however they like (progress bars, structured logs).

/// Progress events emitted while collecting repositories and owner websites.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Progress {
    /// Starting to walk one star range.
    SearchingRange {
        /// Search query, e.g. `stars:>=20000`.
        query: String,
        /// 1-indexed slice number within the narrowing loop.
        slice: usize,
    },

    /// Fetched one page of search results.
    FetchedPage {
        /// Search query this page belongs to.
        query: String,
        /// Page number (1-indexed) within the query.
        page: u32,
        /// Items on this page.
        count: usize,
        /// Items fetched for this query so far.
        total_so_far: usize,
        /// Total pages for this query (from the Link header), if known.
        expected_pages: Option<u32>,
    },

    /// Finished one star range.
    SliceComplete {
        /// Search query that finished.
        query: String,
        /// Items the slice returned.
        count: usize,
        /// Distinct repositories collected across all slices so far.
        unique_total: usize,
    },

    /// A slice hit the result-window cap; the upper bound moves down.
    NarrowingRange {
        /// New inclusive upper bound.
        max_stars: u64,
    },

    /// The upper bound could not move (too many repositories share one star count).
    RangeStalled {
        /// The star count every remaining item shares.
        stars: u64,
        /// The result-window cap that was hit.
        result_cap: usize,
    },

    /// Range fetching finished.
    FetchComplete {
        /// Distinct repositories collected.
        total: usize,
        /// Number of slices walked.
        slices: usize,
    },

    /// Starting owner enrichment.
    EnrichingOwners {
        /// Number of repositories to process.
        total: usize,
    },

    /// Looking up one owner.
    ResolvingOwner {
        /// Repository being processed.
        repo: String,
        /// Owner login.
        owner: String,
    },

    /// Owner profile fetched.
    OwnerResolved {
        /// Repository being processed.
        repo: String,
        /// Owner login.
        owner: String,
        /// Website extracted from the profile, if any.
        website: Option<String>,
    },

    /// Owner profile could not be fetched; website recorded as unknown.
    OwnerFailed {
        /// Repository being processed.
        repo: String,
        /// Owner login.
        owner: String,
        /// Error message.
        error: String,
    },

    /// A transient failure; sleeping before the next attempt.
    RetryBackoff {
        /// URL being fetched.
        url: String,
        /// Attempt that just failed (1-indexed).
        attempt: u32,
        /// Time to wait before the next attempt (ms).
        delay_ms: u64,
        /// Error message.
        error: String,
    },

    /// Owner enrichment finished.
    EnrichComplete {
        /// Records produced.
        total: usize,
        /// Owners whose profile was fetched.
        resolved: usize,
        /// Owners whose lookup failed.
        failed: usize,
    },
}

/// Callback for progress updates.
pub type ProgressCallback = Box<dyn Fn(Progress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(callback: Option<&ProgressCallback>, event: Progress) {
    if let Some(cb) = callback {
        cb(event);
    }
}
