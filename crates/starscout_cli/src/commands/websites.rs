use std::path::{Path, PathBuf};
use std::sync::Arc;

use starscout::{EnrichOptions, EnrichReport, GitHubClient, enrich, store};

use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::shutdown::is_shutdown_requested;

pub(crate) async fn handle_websites(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = input.unwrap_or_else(|| config.websites.input.clone());
    let output = output.unwrap_or_else(|| config.websites.output.clone());

    let token = config.github_token().ok_or(
        "GitHub token required. Set GITHUB_TOKEN or STARSCOUT_GITHUB__TOKEN, \
         or add token to the [github] section of the config file.",
    )?;
    let client = GitHubClient::new(Some(token), config.timeout())?
        .with_api_url(config.github.api_url.as_str());

    let reporter = Arc::new(ProgressReporter::new());
    let report = run_websites(
        &client,
        &input,
        &output,
        &config.enrich_options(),
        &reporter,
        is_shutdown_requested,
    )
    .await;
    reporter.finish();
    let report = report?;

    if report.interrupted {
        println!(
            "Interrupted after {} repositories; partial results saved to {}",
            report.records.len(),
            output.display()
        );
    } else {
        println!(
            "Done. {} owners resolved, {} failed. Results saved to {}",
            report.resolved,
            report.failed,
            output.display()
        );
    }
    Ok(())
}

/// Read the repository list, resolve owner websites, and write the records.
///
/// Records collected before a stop request are still written.
async fn run_websites(
    client: &GitHubClient,
    input: &Path,
    output: &Path,
    options: &EnrichOptions,
    reporter: &Arc<ProgressReporter>,
    should_stop: impl Fn() -> bool,
) -> Result<EnrichReport, Box<dyn std::error::Error>> {
    let repos = store::load_repositories(input)?;
    tracing::info!(count = repos.len(), input = %input.display(), "Loaded repositories");

    let callback = reporter.as_callback();
    let report =
        enrich::enrich_owners_until(client, &repos, options, Some(&callback), should_stop).await;

    store::save_websites(output, &report.records)?;
    Ok(report)
}
