//! Route registry: the introspectable table of everything the server mounts.
//!
//! The table is populated once during bootstrap and read-only afterwards.
//! Named routes resolve to absolute URLs against the application base URL;
//! resolving a name that was never registered is a configuration error and
//! fails immediately.

use anyhow::{bail, Context, Result};
use axum::http::Method;
use url::Url;

#[derive(Clone, Debug)]
pub struct Route {
    method: Method,
    path: String,
    name: Option<String>,
}

impl Route {
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[derive(Clone, Debug)]
pub struct RouteTable {
    base: Url,
    routes: Vec<Route>,
}

impl RouteTable {
    #[must_use]
    pub const fn new(base: Url) -> Self {
        Self {
            base,
            routes: Vec::new(),
        }
    }

    /// Register an anonymous route.
    pub fn register(&mut self, method: Method, path: &str) {
        self.routes.push(Route {
            method,
            path: normalize(path),
            name: None,
        });
    }

    /// Register a route addressable by name (e.g. `login`).
    pub fn register_named(&mut self, method: Method, path: &str, name: &str) {
        self.routes.push(Route {
            method,
            path: normalize(path),
            name: Some(name.to_string()),
        });
    }

    /// Resolve a named route to an absolute URL.
    ///
    /// # Errors
    /// Fails when no route carries `name`; callers are expected to treat this
    /// as a configuration error, not a runtime condition.
    pub fn url(&self, name: &str) -> Result<String> {
        let Some(route) = self
            .routes
            .iter()
            .find(|route| route.name.as_deref() == Some(name))
        else {
            bail!("no route registered with name `{name}`");
        };

        self.base
            .join(&route.path)
            .map(Into::into)
            .with_context(|| format!("failed to resolve URL for route `{name}`"))
    }

    /// Whether any route is mounted at `path` (leading slash optional).
    #[must_use]
    pub fn has_path(&self, path: &str) -> bool {
        let path = normalize(path);
        self.routes.iter().any(|route| route.path == path)
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

fn normalize(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
