use std::env;
use std::time::Duration;

/// Analytics engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of worker tasks draining the calculation queue.
    pub workers: usize,
    /// Bounded queue capacity; enqueues beyond this are rejected.
    pub queue_capacity: usize,
    /// How long a cached metric snapshot stays fresh.
    pub cache_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 1000,
            cache_ttl: Duration::from_secs(3600), // 1 hour
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            workers: env::var("VANTAGE_WORKERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.workers),
            queue_capacity: env::var("VANTAGE_QUEUE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.queue_capacity),
            cache_ttl: env::var("VANTAGE_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
        }
    }
}
