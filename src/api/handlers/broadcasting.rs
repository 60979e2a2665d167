//! Channel authorization handshakes and event publication.

use crate::broadcast::{Channel, Event, NewMessage};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct ChannelAuthRequest {
    channel_name: String,
    #[serde(default)]
    #[allow(dead_code)]
    socket_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/broadcasting/auth",
    request_body = ChannelAuthRequest,
    responses(
        (status = 200, description = "Subscription authorized"),
        (status = 403, description = "Channel requires authorization this deployment does not grant")
    ),
    tag = "broadcast"
)]
// axum handler for the channel-authorization handshake
pub async fn authorize(Json(request): Json<ChannelAuthRequest>) -> impl IntoResponse {
    let channel = Channel::new(request.channel_name);

    if channel.is_public() {
        // Public channels need no signature; an empty auth payload is enough.
        return (StatusCode::OK, Json(json!({"auth": ""}))).into_response();
    }

    // No private or presence channels are defined.
    (
        StatusCode::FORBIDDEN,
        Json(json!({"message": "Forbidden"})),
    )
        .into_response()
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct PublishRequest {
    message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct PublishResponse {
    message: String,
    channels: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/broadcast",
    request_body = PublishRequest,
    responses(
        (status = 202, description = "Event handed to the broadcast transport", body = [PublishResponse])
    ),
    tag = "broadcast"
)]
// axum handler publishing a message event; the authentication gate runs
// before this. Delivery itself belongs to the external transport.
pub async fn publish(Json(request): Json<PublishRequest>) -> impl IntoResponse {
    let event = NewMessage::new(request.message);
    let channels: Vec<String> = event
        .broadcast_on()
        .iter()
        .map(ToString::to_string)
        .collect();

    for channel in &channels {
        info!(channel = %channel, "Broadcasting message event");
    }

    (
        StatusCode::ACCEPTED,
        Json(PublishResponse {
            message: event.message,
            channels,
        }),
    )
}
