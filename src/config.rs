//! Static application configuration, built once at startup.

use anyhow::{Context, Result};
use url::Url;

const DEFAULT_HOME_PATH: &str = "/dashboard";
const DEFAULT_API_RATE_LIMIT_PER_MINUTE: u32 = 60;

/// Read-only configuration shared by the gates.
///
/// Constructed from CLI arguments before the server starts and passed by
/// reference (behind an `Arc`) everywhere else; nothing mutates it at
/// request time.
#[derive(Clone, Debug)]
pub struct AppConfig {
    app_url: Url,
    home_path: String,
    trusted_hosts: Vec<String>,
    api_rate_limit_per_minute: u32,
}

impl AppConfig {
    /// Parse the application base URL and apply defaults for the rest.
    ///
    /// # Errors
    /// Returns an error when `app_url` is not an absolute URL with a host.
    pub fn new(app_url: &str) -> Result<Self> {
        let app_url = Url::parse(app_url)
            .with_context(|| format!("Invalid application URL: {app_url}"))?;

        app_url
            .host_str()
            .with_context(|| format!("Application URL must include a host: {app_url}"))?;

        Ok(Self {
            app_url,
            home_path: DEFAULT_HOME_PATH.to_string(),
            trusted_hosts: Vec::new(),
            api_rate_limit_per_minute: DEFAULT_API_RATE_LIMIT_PER_MINUTE,
        })
    }

    #[must_use]
    pub fn with_home_path(mut self, path: String) -> Self {
        // Home is always expressed as an absolute path on the app URL.
        if path.starts_with('/') {
            self.home_path = path;
        } else {
            self.home_path = format!("/{path}");
        }
        self
    }

    #[must_use]
    pub fn with_trusted_hosts(mut self, hosts: Vec<String>) -> Self {
        self.trusted_hosts = hosts;
        self
    }

    #[must_use]
    pub const fn with_api_rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.api_rate_limit_per_minute = limit;
        self
    }

    #[must_use]
    pub const fn app_url(&self) -> &Url {
        &self.app_url
    }

    #[must_use]
    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    /// Absolute URL of the configured home location.
    #[must_use]
    pub fn home_url(&self) -> String {
        self.app_url
            .join(&self.home_path)
            .map_or_else(|_| self.home_path.clone(), Into::into)
    }

    #[must_use]
    pub fn trusted_hosts(&self) -> &[String] {
        &self.trusted_hosts
    }

    #[must_use]
    pub const fn api_rate_limit_per_minute(&self) -> u32 {
        self.api_rate_limit_per_minute
    }
}
