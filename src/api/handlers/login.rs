//! The named `login` route: the guest-only login page and the credential
//! exchange issuing session tokens.

use crate::auth::SessionStore;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginRequest {
    username: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    token: String,
}

#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Login page"),
        (status = 302, description = "Already authenticated, redirected home")
    ),
    tag = "auth"
)]
// axum handler for the login page; the guest gate runs before this.
pub async fn show() -> impl IntoResponse {
    "login"
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = [LoginResponse]),
        (status = 422, description = "Missing username")
    ),
    tag = "auth"
)]
pub async fn submit(
    Extension(sessions): Extension<Arc<SessionStore>>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    if request.username.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({"message": "username must not be empty"})),
        )
            .into_response();
    }

    let token = sessions.issue(request.username.trim());
    info!(username = %request.username, "Session issued");

    (StatusCode::OK, Json(LoginResponse { token })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn show_renders_login() -> Result<()> {
        let response = show().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(body.as_ref(), b"login");
        Ok(())
    }

    #[tokio::test]
    async fn submit_issues_a_session_token() -> Result<()> {
        let sessions = Arc::new(SessionStore::new());

        let response = submit(
            Extension(Arc::clone(&sessions)),
            Json(LoginRequest {
                username: "ana".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let login: LoginResponse = serde_json::from_slice(&body)?;
        assert!(sessions.contains(&login.token));
        Ok(())
    }

    #[tokio::test]
    async fn submit_rejects_blank_username() -> Result<()> {
        let sessions = Arc::new(SessionStore::new());

        let response = submit(
            Extension(sessions),
            Json(LoginRequest {
                username: "   ".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        Ok(())
    }
}
