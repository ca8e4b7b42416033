//! Per-source-address fixed-window rate limiting.
//!
//! Two windows per address: a global one across every route and a tighter
//! one for `/execute`, which is the expensive path.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;

const WINDOW: Duration = Duration::from_secs(60);
const GLOBAL_LIMIT: u32 = 100;
const EXECUTE_LIMIT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    Global,
    Execute,
}

impl Class {
    fn limit(self) -> u32 {
        match self {
            Class::Global => GLOBAL_LIMIT,
            Class::Execute => EXECUTE_LIMIT,
        }
    }
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counters keyed by source address and class.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<(IpAddr, Class), Window>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(&self, ip: IpAddr, class: Class) -> bool {
        self.allow_at(ip, class, Instant::now())
    }

    fn allow_at(&self, ip: IpAddr, class: Class, now: Instant) -> bool {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let window = windows.entry((ip, class)).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= WINDOW {
            window.started = now;
            window.count = 0;
        }
        if window.count >= class.limit() {
            false
        } else {
            window.count += 1;
            true
        }
    }
}

/// Middleware enforcing both windows. Requests without connection info (unit
/// tests, some proxies) count against the loopback address.
pub async fn enforce(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::LOCALHOST), |info| info.0.ip());

    if !state.limiter.allow(ip, Class::Global) {
        tracing::warn!(%ip, "global rate limit exceeded");
        return ApiError::rate_limited().into_response();
    }
    if request.uri().path() == "/execute" && !state.limiter.allow(ip, Class::Execute) {
        tracing::warn!(%ip, "execute rate limit exceeded");
        return ApiError::rate_limited().into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn allows_up_to_the_limit_then_blocks() {
        let limiter = RateLimiter::new();
        let now = Instant::now();
        for _ in 0..EXECUTE_LIMIT {
            assert!(limiter.allow_at(ip(1), Class::Execute, now));
        }
        assert!(!limiter.allow_at(ip(1), Class::Execute, now));
    }

    #[test]
    fn addresses_are_independent() {
        let limiter = RateLimiter::new();
        let now = Instant::now();
        for _ in 0..EXECUTE_LIMIT {
            assert!(limiter.allow_at(ip(1), Class::Execute, now));
        }
        assert!(limiter.allow_at(ip(2), Class::Execute, now));
    }

    #[test]
    fn classes_are_independent() {
        let limiter = RateLimiter::new();
        let now = Instant::now();
        for _ in 0..EXECUTE_LIMIT {
            assert!(limiter.allow_at(ip(1), Class::Execute, now));
        }
        assert!(limiter.allow_at(ip(1), Class::Global, now));
    }

    #[test]
    fn window_resets_after_a_minute() {
        let limiter = RateLimiter::new();
        let now = Instant::now();
        for _ in 0..EXECUTE_LIMIT {
            assert!(limiter.allow_at(ip(1), Class::Execute, now));
        }
        assert!(!limiter.allow_at(ip(1), Class::Execute, now));
        let later = now + WINDOW;
        assert!(limiter.allow_at(ip(1), Class::Execute, later));
    }
}
