//! `OpenAPI` document for the served routes.
//!
//! Add new documented endpoints to `paths(...)` so the Swagger UI and the
//! spec stay in sync with the router; `/` stays undocumented on purpose.

use crate::api::handlers::{broadcasting, dashboard, health, login, ping};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "pasejo",
        description = "Edge gatekeeper: authentication gates, trusted hosts and channel authorization"
    ),
    paths(
        health::health,
        login::show,
        login::submit,
        dashboard::show,
        broadcasting::authorize,
        broadcasting::publish,
        ping::ping,
    ),
    components(schemas(
        health::Health,
        login::LoginRequest,
        login::LoginResponse,
        broadcasting::ChannelAuthRequest,
        broadcasting::PublishRequest,
        broadcasting::PublishResponse,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Authentication gates and sessions"),
        (name = "broadcast", description = "Channel authorization and event publication"),
        (name = "api", description = "Rate-limited API surface")
    )
)]
pub struct ApiDoc;
