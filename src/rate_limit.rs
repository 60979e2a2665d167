//! Named rate-limit policies and the throttle middleware applying them.

use axum::{
    extract::{Extension, Request},
    http::{
        header::{HeaderName, HeaderValue, AUTHORIZATION, RETRY_AFTER},
        StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use tracing::{debug, error};

/// Name of the policy guarding `/api` routes, registered at bootstrap.
pub const API_POLICY: &str = "api";

const X_RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const X_RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug)]
struct WindowSlot {
    started: Instant,
    count: u32,
}

/// Fixed-window limiter: `max_attempts` per `window` per key.
#[derive(Debug)]
pub struct Limiter {
    max_attempts: u32,
    window: Duration,
    slots: Mutex<HashMap<String, WindowSlot>>,
}

impl Limiter {
    #[must_use]
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            slots: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn per_minute(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::from_secs(60))
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Record one attempt for `key` and decide whether it is allowed.
    pub fn attempt(&self, key: &str) -> RateLimitDecision {
        let now = Instant::now();
        let Ok(mut slots) = self.slots.lock() else {
            // A poisoned lock means a panic mid-update; fail open.
            return RateLimitDecision::Allowed {
                remaining: self.max_attempts,
            };
        };

        let slot = slots.entry(key.to_string()).or_insert(WindowSlot {
            started: now,
            count: 0,
        });

        if now.duration_since(slot.started) >= self.window {
            slot.started = now;
            slot.count = 0;
        }

        if slot.count >= self.max_attempts {
            return RateLimitDecision::Limited {
                retry_after: self.window.saturating_sub(now.duration_since(slot.started)),
            };
        }

        slot.count += 1;
        RateLimitDecision::Allowed {
            remaining: self.max_attempts - slot.count,
        }
    }

    /// Drop windows that expired, so idle keys do not accumulate.
    pub fn prune(&self) {
        let now = Instant::now();
        if let Ok(mut slots) = self.slots.lock() {
            slots.retain(|_, slot| now.duration_since(slot.started) < self.window);
        }
    }
}

/// Registry of named policies, populated during bootstrap and read-only at
/// request time.
#[derive(Debug, Default)]
pub struct RateLimiterRegistry {
    limiters: HashMap<String, Arc<Limiter>>,
}

impl RateLimiterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, limiter: Limiter) {
        self.limiters.insert(name.to_string(), Arc::new(limiter));
    }

    /// Look up a policy by name.
    #[must_use]
    pub fn limiter(&self, name: &str) -> Option<Arc<Limiter>> {
        self.limiters.get(name).cloned()
    }

    /// Prune expired windows across every registered policy.
    pub fn prune(&self) {
        for limiter in self.limiters.values() {
            limiter.prune();
        }
    }
}

/// Middleware applying the `api` policy, keyed per client.
///
/// The key is the bearer token when present, otherwise the first
/// `x-forwarded-for` hop; anonymous direct clients share one bucket.
pub async fn throttle(
    Extension(limiters): Extension<Arc<RateLimiterRegistry>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(limiter) = limiters.limiter(API_POLICY) else {
        error!("Rate limit policy `{API_POLICY}` is not registered");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let key = client_key(&request);

    match limiter.attempt(&key) {
        RateLimitDecision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            if let Ok(limit) = HeaderValue::from_str(&limiter.max_attempts().to_string()) {
                headers.insert(X_RATE_LIMIT_LIMIT, limit);
            }
            if let Ok(remaining) = HeaderValue::from_str(&remaining.to_string()) {
                headers.insert(X_RATE_LIMIT_REMAINING, remaining);
            }
            response
        }
        RateLimitDecision::Limited { retry_after } => {
            debug!(key = %key, "Rate limited");
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"message": "Too Many Attempts."})),
            )
                .into_response();
            if let Ok(value) = HeaderValue::from_str(&retry_after.as_secs().max(1).to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
            response
        }
    }
}

fn client_key(request: &Request) -> String {
    let headers = request.headers();

    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        return format!("token:{token}");
    }

    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map_or_else(|| "anonymous".to_string(), |ip| format!("ip:{}", ip.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_until_the_window_is_full() {
        let limiter = Limiter::per_minute(3);
        assert_eq!(
            limiter.attempt("k"),
            RateLimitDecision::Allowed { remaining: 2 }
        );
        assert_eq!(
            limiter.attempt("k"),
            RateLimitDecision::Allowed { remaining: 1 }
        );
        assert_eq!(
            limiter.attempt("k"),
            RateLimitDecision::Allowed { remaining: 0 }
        );
        assert!(matches!(
            limiter.attempt("k"),
            RateLimitDecision::Limited { .. }
        ));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = Limiter::per_minute(1);
        assert!(matches!(
            limiter.attempt("a"),
            RateLimitDecision::Allowed { .. }
        ));
        assert!(matches!(
            limiter.attempt("b"),
            RateLimitDecision::Allowed { .. }
        ));
        assert!(matches!(
            limiter.attempt("a"),
            RateLimitDecision::Limited { .. }
        ));
    }

    #[test]
    fn expired_windows_reset() {
        let limiter = Limiter::new(1, Duration::ZERO);
        assert!(matches!(
            limiter.attempt("k"),
            RateLimitDecision::Allowed { .. }
        ));
        // Zero-length window: the next attempt starts a fresh one.
        assert!(matches!(
            limiter.attempt("k"),
            RateLimitDecision::Allowed { .. }
        ));
    }

    #[test]
    fn prune_drops_expired_slots() {
        let limiter = Limiter::new(1, Duration::ZERO);
        let _ = limiter.attempt("k");
        limiter.prune();
        assert!(limiter.slots.lock().unwrap().is_empty());
    }

    #[test]
    fn registry_resolves_registered_policies() {
        let mut registry = RateLimiterRegistry::new();
        registry.register(API_POLICY, Limiter::per_minute(60));
        assert!(registry.limiter(API_POLICY).is_some());
        assert!(registry.limiter("missing").is_none());
    }
}
