//! # Pasejo (Edge Gatekeeper)
//!
//! `pasejo` sits at the edge of an application and decides where requests go
//! before any business handler runs:
//!
//! - **Authentication gate**: unauthenticated browser requests are redirected
//!   to the named `login` route; JSON clients get a `401` instead.
//! - **Guest gate**: already-authenticated users are bounced away from
//!   guest-only routes (like `/login`) to the configured home location.
//! - **Host trust**: only requests whose `Host` header matches the configured
//!   hostname patterns (wildcard subdomains included) are served.
//! - **Channel authorization**: broadcast events declare the channels they
//!   publish on, and `/broadcasting/auth` answers subscription handshakes.
//! - **Rate limiting**: named policies (the `api` policy out of the box) are
//!   registered at bootstrap and applied per client.
//!
//! All decisions are single-step functions of the request and static
//! configuration; the route table, guard registry, rate-limiter registry and
//! trusted-host list are built once at bootstrap and read-only afterwards.

pub mod api;
pub mod auth;
pub mod broadcast;
pub mod cli;
pub mod config;
pub mod hosts;
pub mod rate_limit;
pub mod routing;
pub mod scheduler;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
