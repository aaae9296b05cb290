//! Service configuration loaded from CLI, environment, and files.
//!
//! Values are merged with ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in service defaults
//! 2. **Configuration file** – `.interaction-fetcher.toml` in the current
//!    directory, home directory, or XDG config directory
//! 3. **Environment variables** – `FETCHER_TOKEN`, `FETCHER_BIND_ADDRESS`,
//!    and so on, plus the legacy `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--token`/`-t`, `--bind-address`/`-b`, ...
//!
//! # Configuration File
//!
//! ```toml
//! token = "ghp_example"
//! api_base = "https://api.github.com"
//! bind_address = "0.0.0.0:8080"
//! page_size = 100
//! max_pages = 50
//! static_dir = "app/static"
//! ```

use std::env;
use std::num::NonZeroU32;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::github::{DEFAULT_PAGE_SIZE, FetchError};
use crate::interactions::WalkOptions;

/// Default GitHub API root.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default listen address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Service configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use interaction_fetcher::FetcherConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = FetcherConfig::load().expect("failed to load configuration");
/// let token = config.resolve_token().expect("token required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "FETCHER",
    discovery(
        dotfile_name = ".interaction-fetcher.toml",
        config_file_name = "interaction-fetcher.toml",
        app_name = "interaction-fetcher"
    )
)]
pub struct FetcherConfig {
    /// Personal access token for GitHub API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `FETCHER_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// GitHub API root; GraphQL requests go to `<api_base>/graphql`.
    ///
    /// Defaults to `https://api.github.com`.
    #[ortho_config()]
    pub api_base: Option<String>,

    /// Socket address the HTTP server listens on.
    ///
    /// Can be provided via:
    /// - CLI: `--bind-address <ADDR>` or `-b <ADDR>`
    /// - Environment: `FETCHER_BIND_ADDRESS`
    /// - Config file: `bind_address = "..."`
    #[ortho_config(cli_short = 'b')]
    pub bind_address: Option<String>,

    /// Nodes requested per collection page, between 1 and 100.
    #[ortho_config()]
    pub page_size: u8,

    /// Optional ceiling on queries per user.
    ///
    /// Unset means a user is paged until GitHub reports every collection
    /// exhausted.
    #[ortho_config()]
    pub max_pages: Option<u32>,

    /// Directory holding `index.html`, served for every unknown route.
    #[ortho_config()]
    pub static_dir: Option<String>,

    /// Prints the service version and exits.
    #[ortho_config(cli_short = 'v')]
    pub show_version: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: None,
            bind_address: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: None,
            static_dir: None,
            show_version: false,
        }
    }
}

impl FetcherConfig {
    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MissingToken`] when no token source provides a
    /// value.
    pub fn resolve_token(&self) -> Result<String, FetchError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or(FetchError::MissingToken)
    }

    /// Returns the configured API root or the public GitHub API.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    /// Returns the configured listen address or `0.0.0.0:8080`.
    #[must_use]
    pub fn bind_address(&self) -> &str {
        self.bind_address.as_deref().unwrap_or(DEFAULT_BIND_ADDRESS)
    }

    /// Returns the directory to serve `index.html` from, if any.
    #[must_use]
    pub fn static_dir(&self) -> Option<Utf8PathBuf> {
        self.static_dir.as_deref().map(Utf8PathBuf::from)
    }

    /// Walk tuning derived from `max_pages`.
    #[must_use]
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            max_pages: self.max_pages.and_then(NonZeroU32::new),
        }
    }

    /// Checks that the configured values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Configuration`] when `page_size` is outside
    /// `1..=100` or `max_pages` is zero, and [`FetchError::InvalidUrl`] when
    /// `api_base` is not an absolute URL.
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.page_size == 0 || self.page_size > DEFAULT_PAGE_SIZE {
            return Err(FetchError::Configuration {
                message: format!(
                    "page_size must be between 1 and {DEFAULT_PAGE_SIZE}, got {}",
                    self.page_size
                ),
            });
        }

        if self.max_pages == Some(0) {
            return Err(FetchError::Configuration {
                message: "max_pages must be at least 1 when set".to_owned(),
            });
        }

        Url::parse(self.api_base())
            .map_err(|error| FetchError::InvalidUrl(format!("{}: {error}", self.api_base())))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests;
