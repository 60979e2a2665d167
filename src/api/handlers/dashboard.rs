use axum::response::IntoResponse;

#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Authenticated home"),
        (status = 302, description = "Unauthenticated browser, redirected to login"),
        (status = 401, description = "Unauthenticated JSON client")
    ),
    tag = "auth"
)]
// axum handler for the home location; the authentication gate runs before this.
pub async fn show() -> impl IntoResponse {
    "dashboard"
}
