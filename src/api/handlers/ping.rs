use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/ping",
    responses(
        (status = 200, description = "Service reachable"),
        (status = 429, description = "Client exceeded the api rate limit")
    ),
    tag = "api"
)]
// axum handler for the representative API route; the `api` throttle runs
// before this.
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"ping": "pong"})))
}
