//! Guards: "is there a currently authenticated identity?"

use anyhow::{Context, Result};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};
use ulid::Ulid;

/// Default guard name, used when a gate is invoked without one.
pub const DEFAULT_GUARD: &str = "web";

/// A resolved authentication check. Implementations answer for one request;
/// they hold no reference back into the session store.
pub trait AuthGuard {
    fn is_authenticated(&self) -> bool;
}

/// In-memory bearer-token session store backing the built-in guard.
///
/// Tokens are issued on login and dropped on logout; the store is the only
/// mutable state in the crate and is safe to share across requests.
#[derive(Debug, Default)]
pub struct SessionStore {
    tokens: RwLock<HashMap<String, String>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a session token for `subject` and return it.
    pub fn issue(&self, subject: &str) -> String {
        let token = Ulid::new().to_string();
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(token.clone(), subject.to_string());
        }
        token
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens
            .read()
            .is_ok_and(|tokens| tokens.contains_key(token))
    }

    pub fn revoke(&self, token: &str) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.remove(token);
        }
    }
}

/// Guard resolved from one request against a session store.
#[derive(Clone, Copy, Debug)]
pub struct SessionGuard {
    authenticated: bool,
}

impl SessionGuard {
    #[must_use]
    pub const fn authenticated(value: bool) -> Self {
        Self {
            authenticated: value,
        }
    }
}

impl AuthGuard for SessionGuard {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// Registry of named guards, assembled once at bootstrap.
///
/// Callers select a guard explicitly (`None` means the default); there is no
/// ambient lookup behind the gates.
#[derive(Debug)]
pub struct Guards {
    default: String,
    stores: HashMap<String, Arc<SessionStore>>,
}

impl Guards {
    #[must_use]
    pub fn new(default: &str, store: Arc<SessionStore>) -> Self {
        let mut stores = HashMap::new();
        stores.insert(default.to_string(), store);
        Self {
            default: default.to_string(),
            stores,
        }
    }

    /// Register an additional named guard.
    pub fn insert(&mut self, name: &str, store: Arc<SessionStore>) {
        self.stores.insert(name.to_string(), Arc::clone(&store));
    }

    /// Resolve the guard `name` (default when `None`) for one request.
    ///
    /// # Errors
    /// Fails when `name` does not refer to a registered guard.
    pub fn guard(&self, name: Option<&str>, headers: &HeaderMap) -> Result<SessionGuard> {
        let name = name.unwrap_or(&self.default);
        let store = self
            .stores
            .get(name)
            .with_context(|| format!("no guard registered with name `{name}`"))?;

        let authenticated =
            bearer_token(headers).is_some_and(|token| store.contains(token));

        Ok(SessionGuard::authenticated(authenticated))
    }
}

/// Extract the bearer token from an `Authorization` header, if any.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn issued_tokens_authenticate_until_revoked() {
        let store = Arc::new(SessionStore::new());
        let guards = Guards::new(DEFAULT_GUARD, Arc::clone(&store));

        let token = store.issue("user-1");
        let headers = headers_with_token(&token);

        assert!(guards.guard(None, &headers).unwrap().is_authenticated());

        store.revoke(&token);
        assert!(!guards.guard(None, &headers).unwrap().is_authenticated());
    }

    #[test]
    fn missing_or_unknown_token_is_unauthenticated() {
        let guards = Guards::new(DEFAULT_GUARD, Arc::new(SessionStore::new()));

        assert!(!guards
            .guard(None, &HeaderMap::new())
            .unwrap()
            .is_authenticated());
        assert!(!guards
            .guard(None, &headers_with_token("bogus"))
            .unwrap()
            .is_authenticated());
    }

    #[test]
    fn named_guards_are_isolated() {
        let web = Arc::new(SessionStore::new());
        let ops = Arc::new(SessionStore::new());
        let mut guards = Guards::new(DEFAULT_GUARD, Arc::clone(&web));
        guards.insert("ops", Arc::clone(&ops));

        let token = ops.issue("operator");
        let headers = headers_with_token(&token);

        assert!(guards
            .guard(Some("ops"), &headers)
            .unwrap()
            .is_authenticated());
        assert!(!guards.guard(None, &headers).unwrap().is_authenticated());
    }

    #[test]
    fn unknown_guard_name_is_an_error() {
        let guards = Guards::new(DEFAULT_GUARD, Arc::new(SessionStore::new()));
        assert!(guards.guard(Some("missing"), &HeaderMap::new()).is_err());
    }
}
