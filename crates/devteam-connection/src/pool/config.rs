//! Pool configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a connection pool
///
/// Immutable after construction. The default contract is to block until a
/// connection becomes available; a bounded wait is opt-in via
/// [`PoolConfig::with_acquire_timeout_ms`]. The size invariants hold for
/// every instance: deserialization goes through the same checks as `new()`
/// and rejects invalid sizes instead of panicking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawPoolConfig")]
pub struct PoolConfig {
    /// Number of connections opened up front
    min_size: usize,
    /// Maximum number of connections that may exist at once
    max_size: usize,
    /// Timeout in milliseconds when acquiring a connection (None = wait)
    acquire_timeout_ms: Option<u64>,
    /// Timeout in milliseconds before an idle connection is closed
    idle_timeout_ms: u64,
}

/// Wire form of [`PoolConfig`], before the size invariants are checked
#[derive(Deserialize)]
struct RawPoolConfig {
    min_size: usize,
    max_size: usize,
    acquire_timeout_ms: Option<u64>,
    idle_timeout_ms: u64,
}

impl TryFrom<RawPoolConfig> for PoolConfig {
    type Error = String;

    fn try_from(raw: RawPoolConfig) -> Result<Self, Self::Error> {
        if raw.max_size == 0 {
            return Err(format!(
                "max_size must be greater than 0, got {}",
                raw.max_size
            ));
        }
        if raw.min_size > raw.max_size {
            return Err(format!(
                "min_size ({}) cannot exceed max_size ({})",
                raw.min_size, raw.max_size
            ));
        }

        Ok(Self {
            min_size: raw.min_size,
            max_size: raw.max_size,
            acquire_timeout_ms: raw.acquire_timeout_ms,
            idle_timeout_ms: raw.idle_timeout_ms,
        })
    }
}

impl PoolConfig {
    /// Create a new pool configuration with the given min and max sizes
    ///
    /// # Panics
    ///
    /// Panics if `min_size > max_size` or if `max_size` is 0.
    pub fn new(min_size: usize, max_size: usize) -> Self {
        assert!(
            max_size > 0,
            "max_size must be greater than 0, got {}",
            max_size
        );
        assert!(
            min_size <= max_size,
            "min_size ({}) cannot exceed max_size ({})",
            min_size,
            max_size
        );

        Self {
            min_size,
            max_size,
            acquire_timeout_ms: None,
            idle_timeout_ms: 600_000, // 10 minutes default
        }
    }

    /// Set a bounded wait for acquisition, in milliseconds
    pub fn with_acquire_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.acquire_timeout_ms = Some(timeout_ms);
        self
    }

    /// Set the idle timeout in milliseconds
    pub fn with_idle_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.idle_timeout_ms = timeout_ms;
        self
    }

    /// Get the minimum pool size
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Get the maximum pool size
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Get the acquire timeout, if one is configured
    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout_ms.map(Duration::from_millis)
    }

    /// Get the idle timeout as a Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

impl Default for PoolConfig {
    /// Default configuration: min 1, max 10, unbounded acquire wait.
    fn default() -> Self {
        Self::new(1, 10)
    }
}
