//! Authentication gates and the guard abstraction behind them.
//!
//! The gates themselves are plain functions over explicit inputs (request
//! headers, a guard, static configuration); the `middleware` submodule wires
//! them into the axum pipeline and translates their decisions into HTTP
//! responses.

pub mod gate;
pub mod guard;
pub mod middleware;

pub use gate::{expects_json, home_redirect, login_redirect};
pub use guard::{AuthGuard, Guards, SessionGuard, SessionStore};

/// Name of the named route unauthenticated browser requests are sent to.
pub const LOGIN_ROUTE: &str = "login";
