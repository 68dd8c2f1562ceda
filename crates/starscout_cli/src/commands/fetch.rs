use std::path::{Path, PathBuf};
use std::sync::Arc;

use starscout::{FetchReport, GitHubClient, SearchOptions, range, store};

use crate::config::Config;
use crate::progress::{ProgressReporter, warn_user};
use crate::shutdown::is_shutdown_requested;

pub(crate) async fn handle_fetch(
    min_stars: Option<u64>,
    output: Option<PathBuf>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let min_stars = min_stars.unwrap_or(config.fetch.min_stars);
    let output = output.unwrap_or_else(|| config.fetch.output.clone());

    let token = config.github_token();
    if let Some(warning) = missing_token_warning(token.as_deref()) {
        warn_user(warning);
    }
    let client =
        GitHubClient::new(token, config.timeout())?.with_api_url(config.github.api_url.as_str());

    let reporter = Arc::new(ProgressReporter::new());
    let report = run_fetch(
        &client,
        min_stars,
        &config.search_options(),
        &output,
        &reporter,
        is_shutdown_requested,
    )
    .await;
    reporter.finish();
    let report = report?;

    println!("Total repos fetched: {}", report.repositories.len());
    if report.stalled {
        println!(
            "Warning: more than {} repositories share one star count; some were skipped",
            config.fetch.result_cap
        );
    }
    println!(
        "Saved {} repositories to {}",
        report.repositories.len(),
        output.display()
    );
    Ok(())
}

fn missing_token_warning(token: Option<&str>) -> Option<&'static str> {
    match token {
        Some(_) => None,
        None => Some("No GitHub token configured; searching unauthenticated with lower rate limits"),
    }
}

/// Run the range fetch and persist the result.
///
/// An interrupted fetch writes nothing and returns an error.
async fn run_fetch(
    client: &GitHubClient,
    min_stars: u64,
    options: &SearchOptions,
    output: &Path,
    reporter: &Arc<ProgressReporter>,
    should_stop: impl Fn() -> bool,
) -> Result<FetchReport, Box<dyn std::error::Error>> {
    let callback = reporter.as_callback();
    let report =
        range::fetch_all_until(client, min_stars, options, Some(&callback), should_stop).await?;

    if report.interrupted {
        return Err(format!(
            "fetch interrupted after {} slices; {} not written",
            report.slices,
            output.display()
        )
        .into());
    }

    store::save_repositories(output, &report.repositories)?;
    Ok(report)
}
