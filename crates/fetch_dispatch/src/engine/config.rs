//! Configuration for dispatch behaviour.
//!
//! Example:
//! ```ignore
//! let config = DispatchConfig::builder()
//!     .channel_capacity(0)
//!     .collect_timeout(Duration::from_secs(10))
//!     .poll_interval(Duration::from_millis(50))
//!     .build();
//! ```
//!
//! # Tuning notes:
//! - `channel_capacity = 0` is a synchronous rendezvous: each worker's send
//!   parks until the collector receives it. Larger values let fast workers
//!   hand off and exit without waiting for the collector.
//! - `collect_timeout` bounds how long the collector waits for any single
//!   result; it only fires when a worker breaks its one-send contract.
//! - `poll_interval` paces cancellable poll loops. Lower is more responsive
//!   shutdown, higher is less idle CPU.

use std::time::Duration;

/// Configuration for a [`Dispatcher`](super::Dispatcher).
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Result channel capacity. 0 = unbuffered rendezvous (the default:
    /// the task count is known, each send meets exactly one receive).
    pub channel_capacity: usize,
    /// Maximum time the collector waits for the next result before assuming
    /// a worker is stuck or has crashed. Default: 30s.
    pub collect_timeout: Duration,
    /// Sleep between iterations of cancellable poll loops. Default: 100ms.
    pub poll_interval: Duration,
    /// Prefix for spawned thread names (`<prefix>-worker-N`,
    /// `<prefix>-watcher`). Default: "dispatch".
    pub thread_name_prefix: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 0,
            collect_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(100),
            thread_name_prefix: "dispatch".to_string(),
        }
    }
}

impl DispatchConfig {
    pub fn builder() -> DispatchConfigBuilder {
        DispatchConfigBuilder::default()
    }
}

/// Builder for [`DispatchConfig`] with method chaining.
#[derive(Default)]
pub struct DispatchConfigBuilder {
    config: DispatchConfig,
}

impl DispatchConfigBuilder {
    /// Set the result channel capacity (0 = rendezvous).
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// Set the per-receive collector timeout.
    ///
    /// - Too low: may abort batches whose fetches are legitimately slow.
    /// - Too high: delays detection of a crashed worker.
    pub fn collect_timeout(mut self, timeout: Duration) -> Self {
        self.config.collect_timeout = timeout;
        self
    }

    /// Set the cancellable-loop polling interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the thread name prefix for workers and the watcher.
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> DispatchConfig {
        self.config
    }
}
