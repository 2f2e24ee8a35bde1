/*!
 * # Rate Limiting Module
 *
 * Fixed-window request counting for the external `/api/v1` surface. Each API key
 * gets `requests_per_window` requests per window; the window starts at the key's
 * first request and the reset instant is reported as epoch milliseconds.
 *
 * Counters live in a `DashMap` by default. With the Redis backend every process
 * shares one counter per key (`INCR` + `PEXPIRE`); when Redis is unreachable the
 * limiter falls back to the local map instead of rejecting traffic.
 */
use chrono::Utc;
use dashmap::DashMap;
use metrics::counter;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_window: u32,
    pub window_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 100,
            window_duration: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    fn window_ms(&self) -> i64 {
        (self.window_duration.as_millis() as i64).max(1)
    }
}

#[derive(Clone)]
pub enum RateLimitBackend {
    InMemory,
    Redis {
        client: Arc<redis::Client>,
        namespace: String,
    },
}

impl Default for RateLimitBackend {
    fn default() -> Self {
        Self::InMemory
    }
}

/// Outcome of one counted request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// When the current window ends, epoch milliseconds
    pub reset_at_ms: i64,
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    window_start_ms: i64,
}

#[derive(Clone)]
enum RateLimitStore {
    InMemory {
        entries: Arc<DashMap<String, WindowEntry>>,
    },
    Redis {
        client: Arc<redis::Client>,
        namespace: String,
        fallback: Arc<DashMap<String, WindowEntry>>,
    },
}

#[derive(Clone)]
pub struct RateLimiter {
    store: RateLimitStore,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, backend: RateLimitBackend) -> Self {
        let store = match backend {
            RateLimitBackend::InMemory => RateLimitStore::InMemory {
                entries: Arc::new(DashMap::new()),
            },
            RateLimitBackend::Redis { client, namespace } => RateLimitStore::Redis {
                client,
                namespace,
                fallback: Arc::new(DashMap::new()),
            },
        };
        Self { store, config }
    }

    pub fn in_memory(config: RateLimitConfig) -> Self {
        Self::new(config, RateLimitBackend::InMemory)
    }

    /// Builds the limiter selected by application configuration
    pub fn from_app_config(cfg: &crate::config::AppConfig) -> Result<Self, RateLimitError> {
        let config = RateLimitConfig {
            requests_per_window: cfg.rate_limit_requests_per_window,
            window_duration: Duration::from_secs(cfg.rate_limit_window_seconds),
        };
        if !cfg.rate_limit_use_redis {
            return Ok(Self::in_memory(config));
        }
        let url = cfg.redis_url.as_deref().ok_or_else(|| {
            RateLimitError::InvalidConfig("redis_url is required for the Redis backend".into())
        })?;
        let client = redis::Client::open(url)?;
        Ok(Self::new(
            config,
            RateLimitBackend::Redis {
                client: Arc::new(client),
                namespace: cfg.rate_limit_namespace.clone(),
            },
        ))
    }

    /// Counts one request against `key` and reports whether it may proceed.
    pub async fn check_rate_limit(&self, key: &str) -> RateLimitResult {
        let result = match &self.store {
            RateLimitStore::InMemory { entries } => {
                Self::check_in_memory(entries, key, &self.config, Utc::now().timestamp_millis())
            }
            RateLimitStore::Redis {
                client,
                namespace,
                fallback,
            } => match client.get_async_connection().await {
                Ok(mut conn) => {
                    match Self::check_with_redis(&mut conn, namespace, key, &self.config).await {
                        Ok(result) => result,
                        Err(err) => {
                            warn!("Redis rate limit error: {}", err);
                            Self::check_in_memory(
                                fallback,
                                key,
                                &self.config,
                                Utc::now().timestamp_millis(),
                            )
                        }
                    }
                }
                Err(err) => {
                    warn!(
                        "Failed to connect to Redis for rate limiting, using fallback: {}",
                        err
                    );
                    Self::check_in_memory(fallback, key, &self.config, Utc::now().timestamp_millis())
                }
            },
        };

        if !result.allowed {
            counter!("mes.rate_limit.rejected", 1);
            debug!(key = %key, "rate limit exceeded");
        }
        result
    }

    fn check_in_memory(
        entries: &DashMap<String, WindowEntry>,
        key: &str,
        config: &RateLimitConfig,
        now_ms: i64,
    ) -> RateLimitResult {
        let window_ms = config.window_ms();
        let mut entry = entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            window_start_ms: now_ms,
        });

        if now_ms - entry.window_start_ms >= window_ms {
            entry.count = 0;
            entry.window_start_ms = now_ms;
        }

        let reset_at_ms = entry.window_start_ms + window_ms;
        if entry.count >= config.requests_per_window {
            return RateLimitResult {
                allowed: false,
                limit: config.requests_per_window,
                remaining: 0,
                reset_at_ms,
            };
        }

        entry.count += 1;
        RateLimitResult {
            allowed: true,
            limit: config.requests_per_window,
            remaining: config.requests_per_window - entry.count,
            reset_at_ms,
        }
    }

    async fn check_with_redis<C>(
        conn: &mut C,
        namespace: &str,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, redis::RedisError>
    where
        C: redis::aio::ConnectionLike + Send,
    {
        let redis_key = format!("{}:{}", namespace, key);
        let window_ms = config.window_ms();

        let count: i64 = conn.incr(&redis_key, 1).await?;
        let mut ttl_ms: i64 = conn.pttl(&redis_key).await.unwrap_or(-1);
        if count == 1 || ttl_ms < 0 {
            let _: Result<(), _> = conn.pexpire(&redis_key, window_ms as usize).await;
            ttl_ms = window_ms;
        }

        let allowed = count <= config.requests_per_window as i64;
        let remaining = if allowed {
            config
                .requests_per_window
                .saturating_sub(count.max(0) as u32)
        } else {
            0
        };

        Ok(RateLimitResult {
            allowed,
            limit: config.requests_per_window,
            remaining,
            reset_at_ms: Utc::now().timestamp_millis() + ttl_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(limit: u32) -> RateLimitConfig {
        RateLimitConfig {
            requests_per_window: limit,
            window_duration: Duration::from_secs(60),
        }
    }

    #[test]
    fn counts_down_then_rejects_within_window() {
        let entries = DashMap::new();
        let cfg = config(2);
        let t0 = 1_700_000_000_000;

        let first = RateLimiter::check_in_memory(&entries, "k", &cfg, t0);
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);
        assert_eq!(first.reset_at_ms, t0 + 60_000);

        let second = RateLimiter::check_in_memory(&entries, "k", &cfg, t0 + 10);
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);

        let third = RateLimiter::check_in_memory(&entries, "k", &cfg, t0 + 20);
        assert!(!third.allowed);
        assert_eq!(third.reset_at_ms, t0 + 60_000);
    }

    #[test]
    fn window_rolls_over_after_duration() {
        let entries = DashMap::new();
        let cfg = config(1);
        let t0 = 1_700_000_000_000;

        assert!(RateLimiter::check_in_memory(&entries, "k", &cfg, t0).allowed);
        assert!(!RateLimiter::check_in_memory(&entries, "k", &cfg, t0 + 59_999).allowed);

        let next = RateLimiter::check_in_memory(&entries, "k", &cfg, t0 + 60_000);
        assert!(next.allowed);
        assert_eq!(next.reset_at_ms, t0 + 120_000);
    }

    #[test]
    fn keys_are_counted_independently() {
        let entries = DashMap::new();
        let cfg = config(1);
        assert!(RateLimiter::check_in_memory(&entries, "a", &cfg, 0).allowed);
        assert!(RateLimiter::check_in_memory(&entries, "b", &cfg, 0).allowed);
        assert!(!RateLimiter::check_in_memory(&entries, "a", &cfg, 1).allowed);
    }
}
