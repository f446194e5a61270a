use anyhow::{anyhow, Result};
use fetch_dispatch::fetch::Fetch;
use std::collections::{HashMap, HashSet};
use std::thread;
use std::time::Duration;

/// Installs a test-writer subscriber so `RUST_LOG`-style filtering works
/// when a test is run with output capture disabled. Safe to call from every
/// test; only the first call wins.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Fetcher scripted per key: optional delay, optional failure, otherwise a
/// predictable payload.
pub struct ScriptedFetcher {
    delays: HashMap<String, Duration>,
    failures: HashSet<String>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            delays: HashMap::new(),
            failures: HashSet::new(),
        }
    }

    pub fn with_delay(mut self, key: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(key.into(), delay);
        self
    }

    pub fn with_failure(mut self, key: impl Into<String>) -> Self {
        self.failures.insert(key.into());
        self
    }
}

impl Fetch<String> for ScriptedFetcher {
    fn fetch(&self, key: &str, _credential: &str) -> Result<String> {
        if let Some(delay) = self.delays.get(key) {
            thread::sleep(*delay);
        }
        if self.failures.contains(key) {
            return Err(anyhow!("simulated failure for {}", key));
        }
        Ok(format!("payload:{}", key))
    }
}
