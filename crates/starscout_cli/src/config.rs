//! Configuration file support for starscout.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `STARSCOUT_`, sections separated by
//!    a double underscore, e.g. `STARSCOUT_FETCH__MIN_STARS`)
//! 3. Local config file (./starscout.toml)
//! 4. XDG config file (~/.config/starscout/config.toml)
//! 5. Built-in defaults
//!
//! The plain `GITHUB_TOKEN` variable is used when no token is configured.
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."  # or use STARSCOUT_GITHUB__TOKEN / GITHUB_TOKEN
//! api_url = "https://api.github.com"
//! timeout_secs = 10
//!
//! [fetch]
//! min_stars = 20000
//! output = "all_top_repos.json"
//! per_page = 100
//! result_cap = 1000
//!
//! [websites]
//! input = "all_top_repos.json"
//! output = "org_websites.json"
//! max_attempts = 3
//! backoff_base_ms = 1000
//! max_backoff_ms = 60000
//! pause_ms = 500
//! jitter = false
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use starscout::github::{DEFAULT_API_URL, DEFAULT_TIMEOUT, MAX_PER_PAGE, SEARCH_RESULT_CAP};
use starscout::retry::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY};
use starscout::store::{REPOS_FILE, WEBSITES_FILE};
use starscout::{DEFAULT_MIN_STARS, EnrichOptions, RetryConfig, SearchOptions};

use crate::progress::warn_user;

const ENV_PREFIX: &str = "STARSCOUT";
const LOCAL_CONFIG: &str = "starscout.toml";
const FALLBACK_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub API access.
    pub github: GitHubConfig,
    /// Repository fetch stage.
    pub fetch: FetchConfig,
    /// Owner website stage.
    pub websites: WebsitesConfig,
}

/// GitHub configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token.
    pub token: Option<String>,
    /// API base URL.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Fetch stage configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Lowest star count to collect.
    pub min_stars: u64,
    /// Where the collected repositories are written.
    pub output: PathBuf,
    /// Search results per page.
    pub per_page: usize,
    /// Results the search API returns per query.
    pub result_cap: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            min_stars: DEFAULT_MIN_STARS,
            output: PathBuf::from(REPOS_FILE),
            per_page: MAX_PER_PAGE,
            result_cap: SEARCH_RESULT_CAP,
        }
    }
}

/// Website stage configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WebsitesConfig {
    /// Repository list to read.
    pub input: PathBuf,
    /// Where the owner websites are written.
    pub output: PathBuf,
    /// Attempts per owner lookup, including the first.
    pub max_attempts: usize,
    /// First retry delay in milliseconds; doubles on each retry.
    pub backoff_base_ms: u64,
    /// Upper bound on a single retry delay in milliseconds.
    pub max_backoff_ms: u64,
    /// Pause after each repository in milliseconds.
    pub pause_ms: u64,
    /// Randomize retry delays.
    pub jitter: bool,
}

impl Default for WebsitesConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(REPOS_FILE),
            output: PathBuf::from(WEBSITES_FILE),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base_ms: DEFAULT_BASE_DELAY.as_millis() as u64,
            max_backoff_ms: DEFAULT_MAX_DELAY.as_millis() as u64,
            pause_ms: starscout::enrich::DEFAULT_PAUSE.as_millis() as u64,
            jitter: false,
        }
    }
}

impl Config {
    /// Load configuration from files and the process environment.
    ///
    /// A config that fails to parse is reported and replaced by defaults.
    pub fn load() -> Self {
        let mut files = Vec::new();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            files.push(xdg_config);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG);
        if local_config.exists() {
            tracing::debug!("Loading config from ./{LOCAL_CONFIG}");
            files.push(local_config);
        }

        let fallback_token = std::env::var(FALLBACK_TOKEN_VAR).ok();
        Self::from_sources(&files, Self::environment(), fallback_token)
    }

    /// Resolve a config from explicit sources, falling back to defaults when
    /// they fail to parse. `fallback_token` applies in both cases.
    fn from_sources(files: &[PathBuf], env: Environment, fallback_token: Option<String>) -> Self {
        let mut config = match Self::build(files, env) {
            Ok(config) => config,
            Err(e) => {
                warn_user(&format!("Failed to load config, using defaults: {e}"));
                Config::default()
            }
        };
        if config.github_token().is_none() {
            config.github.token = fallback_token.filter(|t| !t.is_empty());
        }
        config
    }

    /// Build a config from explicit sources; later files override earlier ones
    /// and `env` overrides every file.
    fn build(files: &[PathBuf], env: Environment) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();
        for path in files {
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }
        builder = builder.add_source(env);

        builder.build()?.try_deserialize()
    }

    /// `STARSCOUT_` prefixed environment variables,
    /// e.g. `STARSCOUT_WEBSITES__PAUSE_MS` -> `websites.pause_ms`.
    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Get the GitHub token, ignoring an empty value.
    pub fn github_token(&self) -> Option<String> {
        self.github.token.clone().filter(|t| !t.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.github.timeout_secs)
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions::new(self.fetch.per_page, self.fetch.result_cap)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            Duration::from_millis(self.websites.backoff_base_ms),
            Duration::from_millis(self.websites.max_backoff_ms),
            self.websites.max_attempts,
        )
        .with_jitter(self.websites.jitter)
    }

    pub fn enrich_options(&self) -> EnrichOptions {
        EnrichOptions {
            retry: self.retry_config(),
            pause: Duration::from_millis(self.websites.pause_ms),
        }
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "starscout").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::TempDir;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::environment().source(Some(map))
    }

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.timeout_secs, 10);
        assert_eq!(config.fetch.min_stars, 20_000);
        assert_eq!(config.fetch.output, PathBuf::from("all_top_repos.json"));
        assert_eq!(config.fetch.per_page, 100);
        assert_eq!(config.fetch.result_cap, 1000);
        assert_eq!(config.websites.input, PathBuf::from("all_top_repos.json"));
        assert_eq!(config.websites.output, PathBuf::from("org_websites.json"));
        assert_eq!(config.websites.max_attempts, 3);
        assert_eq!(config.websites.backoff_base_ms, 1000);
        assert_eq!(config.websites.max_backoff_ms, 60_000);
        assert_eq!(config.websites.pause_ms, 500);
        assert!(!config.websites.jitter);
    }

    #[test]
    fn test_defaults_map_to_library_options() {
        let config = Config::default();
        assert_eq!(config.search_options(), SearchOptions::default());
        assert_eq!(config.retry_config(), RetryConfig::default());
        assert_eq!(config.enrich_options(), EnrichOptions::default());
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_config_builder_with_toml_string() {
        let toml_content = r#"
            [github]
            token = "ghp_test123"

            [fetch]
            min_stars = 5000

            [websites]
            pause_ms = 0
        "#;

        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(toml_content, FileFormat::Toml))
            .build()
            .unwrap();
        let config: Config = settings.try_deserialize().unwrap();

        assert_eq!(config.github_token(), Some("ghp_test123".to_string()));
        assert_eq!(config.fetch.min_stars, 5000);
        assert_eq!(config.fetch.per_page, 100);
        assert_eq!(config.enrich_options().pause, Duration::ZERO);
    }

    #[test]
    fn test_local_file_overrides_xdg_file() {
        let dir = TempDir::new().unwrap();
        let xdg = write(
            &dir,
            "config.toml",
            "[fetch]\nmin_stars = 1000\noutput = \"xdg.json\"\n",
        );
        let local = write(&dir, "starscout.toml", "[fetch]\nmin_stars = 2000\n");

        let config = Config::from_sources(&[xdg, local], env(&[]), None);

        assert_eq!(config.fetch.min_stars, 2000);
        assert_eq!(config.fetch.output, PathBuf::from("xdg.json"));
    }

    #[test]
    fn test_environment_overrides_files() {
        let dir = TempDir::new().unwrap();
        let file = write(
            &dir,
            "starscout.toml",
            "[websites]\nmax_attempts = 5\npause_ms = 100\n",
        );

        let config = Config::from_sources(
            &[file],
            env(&[
                ("STARSCOUT_WEBSITES__MAX_ATTEMPTS", "7"),
                ("STARSCOUT_GITHUB__API_URL", "https://ghe.example.com/api/v3"),
            ]),
            None,
        );

        assert_eq!(config.websites.max_attempts, 7);
        assert_eq!(config.websites.pause_ms, 100);
        assert_eq!(config.github.api_url, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_github_token_fallback() {
        let config = Config::from_sources(&[], env(&[]), Some("from-env".into()));
        assert_eq!(config.github_token(), Some("from-env".to_string()));

        let config = Config::from_sources(
            &[],
            env(&[("STARSCOUT_GITHUB__TOKEN", "configured")]),
            Some("from-env".into()),
        );
        assert_eq!(config.github_token(), Some("configured".to_string()));

        let config = Config::from_sources(&[], env(&[]), Some(String::new()));
        assert_eq!(config.github_token(), None);
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_sources(&[dir.path().join("absent.toml")], env(&[]), None);
        assert_eq!(config.fetch.min_stars, 20_000);
    }

    #[test]
    fn test_config_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "starscout.toml", "[fetch\nmin_stars = 1\n");
        assert!(Config::build(&[file], env(&[])).is_err());
    }

    #[test]
    fn test_invalid_toml_falls_back_to_defaults_and_keeps_token() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "starscout.toml", "[fetch
min_stars = 1
");

        let config = Config::from_sources(&[file], env(&[]), Some("ghp_present".into()));

        assert_eq!(config.github_token(), Some("ghp_present".to_string()));
        assert_eq!(config.fetch.min_stars, 20_000);
        assert_eq!(config.websites.pause_ms, 500);
    }

    #[test]
    fn test_unparseable_env_value_keeps_token() {
        let vars = [("STARSCOUT_FETCH__MIN_STARS", "abc")];
        assert!(Config::build(&[], env(&vars)).is_err());

        let config = Config::from_sources(&[], env(&vars), Some("ghp_present".into()));

        assert_eq!(config.github_token(), Some("ghp_present".to_string()));
        assert_eq!(config.fetch.min_stars, 20_000);
    }

    #[test]
    fn test_jitter_reaches_retry_config() {
        let config = Config::from_sources(&[], env(&[("STARSCOUT_WEBSITES__JITTER", "true")]), None);

        assert!(config.websites.jitter);
        assert!(config.retry_config().with_jitter);
        assert!(config.enrich_options().retry.with_jitter);
    }

    #[test]
    fn test_config_unknown_fields_ignored() {
        let toml_content = r#"
            [fetch]
            min_stars = 60
            unknown_field = "should be ignored"
        "#;

        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(toml_content, FileFormat::Toml))
            .build()
            .unwrap();
        let config: Config = settings.try_deserialize().unwrap();
        assert_eq!(config.fetch.min_stars, 60);
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path().unwrap();
        assert!(path.to_string_lossy().contains("starscout"));
        assert!(path.ends_with("config.toml"));
    }
}
