//! The two redirect decisions, as plain functions over explicit inputs.

use crate::{
    auth::{guard::AuthGuard, LOGIN_ROUTE},
    config::AppConfig,
    routing::RouteTable,
};
use anyhow::Result;
use axum::http::{header::ACCEPT, HeaderMap};

/// Whether the request prefers a JSON response.
///
/// True when the first acceptable media type is `*/json` or `*+json`,
/// mirroring the usual content-negotiation convention for API clients.
#[must_use]
pub fn expects_json(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(ACCEPT).and_then(|value| value.to_str().ok()) else {
        return false;
    };

    let first = accept
        .split(',')
        .next()
        .map(|media| media.split(';').next().unwrap_or(media).trim())
        .unwrap_or_default();

    first.ends_with("/json") || first.ends_with("+json")
}

/// Where to send an unauthenticated request.
///
/// JSON clients get `None` (the HTTP layer answers 401 instead of
/// redirecting); everyone else gets the absolute URL of the named `login`
/// route.
///
/// # Errors
/// Fails when no `login` route is registered. Bootstrap validates the route
/// before serving, so hitting this at request time means the table was built
/// outside [`crate::api::App::bootstrap`].
pub fn login_redirect(headers: &HeaderMap, routes: &RouteTable) -> Result<Option<String>> {
    if expects_json(headers) {
        return Ok(None);
    }
    routes.url(LOGIN_ROUTE).map(Some)
}

/// Where to send an already-authenticated request hitting a guest-only
/// route; `None` lets the request through. Exactly one guard check happens
/// per call.
#[must_use]
pub fn home_redirect(guard: &dyn AuthGuard, config: &AppConfig) -> Option<String> {
    guard.is_authenticated().then(|| config.home_url())
}
