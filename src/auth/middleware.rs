//! Axum wiring for the gates.
//!
//! Each middleware resolves the default guard for the request, asks the
//! corresponding gate for a decision, and translates it into an HTTP
//! response. The inner handler runs at most once and its response is passed
//! through untouched.

use crate::{
    auth::{gate, guard::AuthGuard, Guards},
    config::AppConfig,
    routing::RouteTable,
};
use axum::{
    extract::{Extension, Request},
    http::{header::LOCATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

/// Require an authenticated session; redirect browsers to `login`, answer
/// JSON clients with 401.
pub async fn require_auth(
    Extension(guards): Extension<Arc<Guards>>,
    Extension(routes): Extension<Arc<RouteTable>>,
    request: Request,
    next: Next,
) -> Response {
    let guard = match guards.guard(None, request.headers()) {
        Ok(guard) => guard,
        Err(err) => {
            error!("Failed to resolve guard: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if guard.is_authenticated() {
        return next.run(request).await;
    }

    match gate::login_redirect(request.headers(), &routes) {
        Ok(Some(location)) => found(&location),
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Unauthenticated."})),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to resolve login route: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Bounce authenticated users away from guest-only routes to home.
pub async fn redirect_if_authenticated(
    Extension(guards): Extension<Arc<Guards>>,
    Extension(config): Extension<Arc<AppConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let guard = match guards.guard(None, request.headers()) {
        Ok(guard) => guard,
        Err(err) => {
            error!("Failed to resolve guard: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match gate::home_redirect(&guard, &config) {
        Some(location) => found(&location),
        None => next.run(request).await,
    }
}

/// A `302 Found` response with the given `Location`.
fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(err) => {
            error!("Redirect location is not a valid header value: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::found;
    use axum::http::{header::LOCATION, StatusCode};

    #[test]
    fn found_sets_status_and_location() {
        let response = found("http://localhost:8080/login");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "http://localhost:8080/login"
        );
    }

    #[test]
    fn invalid_location_is_a_server_error() {
        let response = found("http://localhost/\u{7f}");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
