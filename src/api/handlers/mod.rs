//! Route handlers.

pub mod broadcasting;
pub mod dashboard;
pub mod health;
pub mod login;
pub mod ping;
pub mod root;
