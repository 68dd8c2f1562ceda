//! Starscout CLI - collect popular GitHub repositories and their owners' websites.

mod commands;
mod config;
mod progress;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "starscout")]
#[command(version)]
#[command(about = "Collect highly-starred GitHub repositories and their owners' websites")]
#[command(
    long_about = "Starscout runs in two stages. `fetch` collects every GitHub repository at or \
above a star threshold, working around the search API's 1000-result limit by narrowing the \
star range. `websites` reads that list and looks up each repository owner's website."
)]
#[command(after_long_help = r#"EXAMPLES
    Collect every repository with at least 20,000 stars:
        $ starscout fetch

    Use a lower threshold and a custom output file:
        $ starscout fetch --min-stars 5000 --output popular.json

    Resolve owner websites for the collected repositories:
        $ GITHUB_TOKEN=ghp_... starscout websites

    Generate shell completions:
        $ starscout completions bash > ~/.local/share/bash-completion/completions/starscout

CONFIGURATION
    Starscout reads configuration from:
      1. ~/.config/starscout/config.toml (or $XDG_CONFIG_HOME/starscout/config.toml)
      2. ./starscout.toml
      3. Environment variables (STARSCOUT_* prefix, sections separated by "__")
      4. .env file in current directory

ENVIRONMENT VARIABLES
    GITHUB_TOKEN                     GitHub token (used when none is configured)
    STARSCOUT_GITHUB__TOKEN          GitHub token
    STARSCOUT_GITHUB__API_URL        API root (default: https://api.github.com)
    STARSCOUT_FETCH__MIN_STARS       Star threshold (default: 20000)
    STARSCOUT_WEBSITES__PAUSE_MS     Pause after each repository (default: 500)
    STARSCOUT_WEBSITES__JITTER       Randomize retry delays (default: false)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect every repository at or above a star threshold
    Fetch {
        /// Lowest star count to include (default from config or 20000)
        #[arg(short, long)]
        min_stars: Option<u64>,

        /// Output file (default from config or all_top_repos.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Look up the website of each repository owner
    ///
    /// Requires a GitHub token.
    Websites {
        /// Repository list written by `fetch` (default from config or all_top_repos.json)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (default from config or org_websites.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Structured logging only when progress bars are not drawn
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("starscout=info,starscout_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => commands::meta::handle_completions(shell)?,
        Commands::Man { output } => commands::meta::handle_man(output)?,
        Commands::Fetch { min_stars, output } => {
            shutdown::setup_shutdown_handler();
            let config = config::Config::load();
            commands::fetch::handle_fetch(min_stars, output, &config).await?;
        }
        Commands::Websites { input, output } => {
            shutdown::setup_shutdown_handler();
            let config = config::Config::load();
            commands::websites::handle_websites(input, output, &config).await?;
        }
    }

    Ok(())
}
