//! Trusted `Host` header patterns and their enforcement middleware.

use crate::config::AppConfig;
use anyhow::{bail, Context, Result};
use axum::{
    extract::{Extension, Request},
    http::{header::HOST, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use regex::Regex;
use std::sync::Arc;
use tracing::warn;

/// Ordered list of hostname patterns the application will serve.
///
/// Built once from static configuration: the app URL's host, all of its
/// subdomains and any explicitly configured patterns. `*` in a pattern
/// matches one or more labels, so `*.example.com` covers `api.example.com`
/// and `a.b.example.com` but not `example.com` itself.
#[derive(Debug)]
pub struct TrustedHosts {
    patterns: Vec<String>,
    matchers: Vec<Regex>,
}

impl TrustedHosts {
    /// # Errors
    /// Fails when the configuration contains an empty host pattern or one
    /// that does not compile to a matcher.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut patterns = Vec::new();

        if let Some(host) = config.app_url().host_str() {
            patterns.push(host.to_string());
            patterns.push(format!("*.{host}"));
        }

        for host in config.trusted_hosts() {
            if host.trim().is_empty() {
                bail!("trusted host patterns must be non-empty");
            }
            patterns.push(host.clone());
        }

        let matchers = patterns
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns, matchers })
    }

    /// The configured pattern list, in registration order.
    #[must_use]
    pub fn hosts(&self) -> &[String] {
        &self.patterns
    }

    /// Whether a `Host` header value is trusted. The port is ignored and
    /// matching is case-insensitive.
    #[must_use]
    pub fn matches(&self, host: &str) -> bool {
        let host = strip_port(host).to_ascii_lowercase();
        !host.is_empty() && self.matchers.iter().any(|matcher| matcher.is_match(&host))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    let expression = format!(
        "^{}$",
        regex::escape(&pattern.to_ascii_lowercase()).replace(r"\*", "[^.]+(?:\\.[^.]+)*")
    );
    Regex::new(&expression).with_context(|| format!("invalid trusted host pattern `{pattern}`"))
}

/// Drop `:port` from a `Host` header value, keeping IPv6 literals intact.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host.find(']').map_or(host, |close| &host[..=close]);
    }
    host.rsplit_once(':').map_or(host, |(name, _)| name)
}

/// Middleware rejecting requests whose `Host` header is missing or untrusted.
pub async fn enforce(
    Extension(hosts): Extension<Arc<TrustedHosts>>,
    request: Request,
    next: Next,
) -> Response {
    let trusted = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|host| hosts.matches(host));

    if trusted {
        return next.run(request).await;
    }

    warn!(
        host = request
            .headers()
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("none"),
        "Rejecting request with untrusted Host header"
    );

    StatusCode::BAD_REQUEST.into_response()
}
