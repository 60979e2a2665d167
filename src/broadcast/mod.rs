//! Broadcast channel descriptors.
//!
//! Events declare the channels they publish on; the transport that actually
//! delivers them (websocket fan-out, pusher-compatible relay, ...) lives
//! outside this crate. Subscription handshakes for these channels are
//! answered by `POST /broadcasting/auth`.

use std::fmt;

/// Channel every [`NewMessage`] is broadcast on.
pub const PUBLIC_MESSAGE_CHANNEL: &str = "new-public-channel";

const PRIVATE_PREFIX: &str = "private-";
const PRESENCE_PREFIX: &str = "presence-";

/// A named broadcast topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    name: String,
}

impl Channel {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Public channels require no subscriber authorization; `private-` and
    /// `presence-` prefixed names do.
    #[must_use]
    pub fn is_public(&self) -> bool {
        !self.name.starts_with(PRIVATE_PREFIX) && !self.name.starts_with(PRESENCE_PREFIX)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A broadcastable application event.
pub trait Event {
    /// The channels this event is published on.
    fn broadcast_on(&self) -> Vec<Channel>;
}

/// Immutable message event, always published on [`PUBLIC_MESSAGE_CHANNEL`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMessage {
    pub message: String,
}

impl NewMessage {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Event for NewMessage {
    fn broadcast_on(&self) -> Vec<Channel> {
        // The target does not vary with the payload.
        vec![Channel::new(PUBLIC_MESSAGE_CHANNEL)]
    }
}
