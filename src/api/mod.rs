//! Bootstrap and HTTP wiring.
//!
//! [`App::bootstrap`] builds everything that must exist before the first
//! request: the route table (with the named `login` route validated), the
//! trusted-host matchers, the guard registry, and the named rate-limit
//! policies. [`router`] then mounts the handlers and gates on top of that
//! read-only state.

use crate::{
    api::handlers::{broadcasting, dashboard, health, login, ping, root},
    auth::{self, Guards, SessionStore, LOGIN_ROUTE},
    config::AppConfig,
    hosts::{self, TrustedHosts},
    rate_limit::{self, Limiter, RateLimiterRegistry, API_POLICY},
    routing::RouteTable,
    scheduler::Schedule,
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    middleware,
    routing::{get, post},
    Extension, Router,
};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod handlers;
mod openapi;

pub use openapi::ApiDoc;

/// Route name for the configured home location.
pub const HOME_ROUTE: &str = "home";

const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Everything built once at startup and shared read-only with requests.
#[derive(Clone, Debug)]
pub struct App {
    pub config: Arc<AppConfig>,
    pub routes: Arc<RouteTable>,
    pub hosts: Arc<TrustedHosts>,
    pub guards: Arc<Guards>,
    pub sessions: Arc<SessionStore>,
    pub limiters: Arc<RateLimiterRegistry>,
}

impl App {
    /// Build the shared state and validate its preconditions.
    ///
    /// # Errors
    /// Fails when the trusted-host patterns are invalid or the named `login`
    /// route does not resolve; both are configuration errors that must stop
    /// the server before it accepts traffic.
    pub fn bootstrap(config: AppConfig) -> Result<Self> {
        let hosts = TrustedHosts::from_config(&config)?;

        let mut routes = RouteTable::new(config.app_url().clone());
        routes.register(Method::GET, "/");
        routes.register(Method::GET, "/health");
        routes.register_named(Method::GET, "/login", LOGIN_ROUTE);
        routes.register(Method::POST, "/login");
        routes.register_named(Method::GET, config.home_path(), HOME_ROUTE);
        routes.register(Method::POST, "/broadcasting/auth");
        routes.register(Method::POST, "/broadcast");
        routes.register(Method::GET, "/api/ping");

        // The authentication gate depends on this name resolving; fail at
        // bootstrap rather than on the first unauthenticated request.
        routes
            .url(LOGIN_ROUTE)
            .context("the `login` route must be registered before serving")?;

        let sessions = Arc::new(SessionStore::new());
        let guards = Guards::new(auth::guard::DEFAULT_GUARD, Arc::clone(&sessions));

        let mut limiters = RateLimiterRegistry::new();
        limiters.register(
            API_POLICY,
            Limiter::per_minute(config.api_rate_limit_per_minute()),
        );

        Ok(Self {
            config: Arc::new(config),
            routes: Arc::new(routes),
            hosts: Arc::new(hosts),
            guards: Arc::new(guards),
            sessions,
            limiters: Arc::new(limiters),
        })
    }

    /// Maintenance jobs for this app, ready to spawn.
    #[must_use]
    pub fn schedule(&self) -> Schedule {
        let mut schedule = Schedule::new();
        let limiters = Arc::clone(&self.limiters);
        schedule.every(PRUNE_INTERVAL, "prune-rate-limit-windows", move || {
            limiters.prune();
        });
        schedule
    }
}

/// Mount handlers, gates and layers on the bootstrapped state.
///
/// # Errors
/// Fails when the application URL cannot be expressed as a CORS origin.
pub fn router(app: &App) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(AllowOrigin::exact(app_origin(app.config.app_url())?))
        .allow_credentials(true);

    let guest = Router::new()
        .route("/login", get(login::show).post(login::submit))
        .route_layer(middleware::from_fn(
            auth::middleware::redirect_if_authenticated,
        ));

    let protected = Router::new()
        .route(app.config.home_path(), get(dashboard::show))
        .route("/broadcast", post(broadcasting::publish))
        .route_layer(middleware::from_fn(auth::middleware::require_auth));

    let api = Router::new()
        .route("/api/ping", get(ping::ping))
        .route_layer(middleware::from_fn(rate_limit::throttle));

    let router = Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health))
        .route("/broadcasting/auth", post(broadcasting::authorize))
        .merge(guest)
        .merge(protected)
        .merge(api)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(Arc::clone(&app.config)))
                .layer(Extension(Arc::clone(&app.routes)))
                .layer(Extension(Arc::clone(&app.hosts)))
                .layer(Extension(Arc::clone(&app.guards)))
                .layer(Extension(Arc::clone(&app.sessions)))
                .layer(Extension(Arc::clone(&app.limiters)))
                .layer(middleware::from_fn(hosts::enforce)),
        );

    Ok(router)
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, config: AppConfig) -> Result<()> {
    let app = App::bootstrap(config)?;

    app.schedule().spawn();

    let router = router(&app)?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn app_origin(app_url: &Url) -> Result<HeaderValue> {
    let host = app_url
        .host_str()
        .ok_or_else(|| anyhow!("Application URL must include a valid host: {app_url}"))?;
    let port = app_url
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", app_url.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build application origin header")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let config = AppConfig::new("http://localhost:8080").unwrap();
        App::bootstrap(config).unwrap()
    }

    #[test]
    fn bootstrap_registers_the_handshake_route() {
        assert!(app().routes.has_path("broadcasting/auth"));
    }

    #[test]
    fn bootstrap_registers_the_api_rate_limit_policy() {
        assert!(app().limiters.limiter(API_POLICY).is_some());
    }

    #[test]
    fn bootstrap_resolves_the_login_route() {
        assert_eq!(
            app().routes.url(LOGIN_ROUTE).unwrap(),
            "http://localhost:8080/login"
        );
    }

    #[test]
    fn schedule_contains_the_prune_job() {
        let schedule = app().schedule();
        let names: Vec<_> = schedule.jobs().iter().map(|job| job.name()).collect();
        assert_eq!(names, ["prune-rate-limit-windows"]);
    }

    #[test]
    fn app_origin_drops_path_and_keeps_port() {
        let url = Url::parse("https://pasejo.dev:8443/base/path").unwrap();
        assert_eq!(app_origin(&url).unwrap(), "https://pasejo.dev:8443");
    }
}
