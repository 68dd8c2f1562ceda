use std::sync::Mutex;
use std::time::Duration;

use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use starscout::Progress;

/// Consolidated progress state to avoid multiple mutex locks.
#[derive(Default)]
struct ProgressState {
    /// Spinner for the range fetch (total unknown until narrowing ends).
    fetch_bar: Option<ProgressBar>,
    /// Bar for owner enrichment.
    enrich_bar: Option<ProgressBar>,
    /// Owners finished, successfully or not.
    owners_processed: usize,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self::with_multi(MultiProgress::new())
    }

    /// A reporter that draws nothing.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self::with_multi(MultiProgress::with_draw_target(
            indicatif::ProgressDrawTarget::hidden(),
        ))
    }

    fn with_multi(multi: MultiProgress) -> Self {
        Self {
            multi,
            state: Mutex::new(ProgressState::default()),
        }
    }

    #[cfg(test)]
    pub fn owners_processed(&self) -> usize {
        self.lock().owners_processed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Handle a progress event.
    pub fn handle(&self, event: Progress) {
        let mut state = self.lock();

        match event {
            Progress::SearchingRange { query, slice } => {
                let pb = state.fetch_bar.get_or_insert_with(|| {
                    let bar = self.multi.add(ProgressBar::new_spinner());
                    bar.set_style(Self::counter_style());
                    bar.set_prefix(format!("{:10}", "fetch"));
                    bar.enable_steady_tick(Duration::from_millis(100));
                    bar
                });
                pb.set_message(format!("slice {slice}: {query}"));
            }

            Progress::FetchedPage {
                query,
                page,
                expected_pages,
                ..
            } => {
                if let Some(pb) = &state.fetch_bar {
                    let pages = match expected_pages {
                        Some(total) => format!("page {page}/{total}"),
                        None => format!("page {page}"),
                    };
                    pb.set_message(format!("{query} {pages}"));
                }
            }

            Progress::SliceComplete { unique_total, .. } => {
                if let Some(pb) = &state.fetch_bar {
                    pb.set_position(unique_total as u64);
                }
            }

            Progress::NarrowingRange { max_stars } => {
                if let Some(pb) = &state.fetch_bar {
                    pb.set_message(format!("narrowing to <= {max_stars} stars"));
                }
            }

            Progress::RangeStalled { stars, result_cap } => {
                self.multi
                    .println(format!(
                        "{} more than {result_cap} repositories have {stars} stars; the rest are skipped",
                        style("⚠").yellow()
                    ))
                    .ok();
            }

            Progress::FetchComplete { total, slices } => {
                if let Some(pb) = state.fetch_bar.take() {
                    pb.set_position(total as u64);
                    pb.finish_with_message(format!("✓ {total} repos in {slices} slices"));
                }
            }

            Progress::EnrichingOwners { total } => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style());
                pb.set_prefix(format!("{:10}", "websites"));
                state.enrich_bar = Some(pb);
            }

            Progress::ResolvingOwner { repo, .. } => {
                if let Some(pb) = &state.enrich_bar {
                    pb.set_message(repo);
                }
            }

            Progress::OwnerResolved { .. } => {
                state.owners_processed += 1;
                if let Some(pb) = &state.enrich_bar {
                    pb.inc(1);
                }
            }

            Progress::OwnerFailed { repo, error, .. } => {
                state.owners_processed += 1;
                if let Some(pb) = &state.enrich_bar {
                    pb.inc(1);
                }
                self.multi
                    .println(format!("{} {repo}: {error}", style("✗").red()))
                    .ok();
            }

            Progress::RetryBackoff {
                url,
                attempt,
                delay_ms,
                ..
            } => {
                if let Some(pb) = &state.enrich_bar {
                    pb.set_message(format!("retry {attempt} in {delay_ms}ms: {url}"));
                }
            }

            Progress::EnrichComplete {
                resolved, failed, ..
            } => {
                if let Some(pb) = state.enrich_bar.take() {
                    let msg = if failed > 0 {
                        format!("✓ {resolved} resolved, {failed} failed")
                    } else {
                        format!("✓ {resolved} resolved")
                    };
                    pb.finish_with_message(msg);
                }
            }

            _ => {}
        }
    }

    /// Finish all progress bars.
    pub fn finish(&self) {
        let mut state = self.lock();
        if let Some(pb) = state.fetch_bar.take() {
            pb.finish();
        }
        if let Some(pb) = state.enrich_bar.take() {
            pb.finish();
        }
    }

    fn counter_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {pos:>6} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>5}/{len:5} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
