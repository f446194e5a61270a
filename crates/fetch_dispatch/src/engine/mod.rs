//! src/engine/mod.rs
//!
//! The fan-out/fan-in dispatch engine.
//!
//! The engine launches one worker per task, funnels every result through a
//! shared channel into a single collector, and coordinates shutdown so no
//! worker outlives its batch.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌────────────┐
//!                  │ Dispatcher │ ←── DispatchConfig (capacity, timeouts)
//!                  └─────┬──────┘
//!                        │ registers with TaskGroup, then spawns
//!                        ↓
//!        [ worker 0 ] [ worker 1 ] ... [ worker N-1 ]
//!              │            │                │
//!              │  fetch(key, credential)     │  (blocking, external I/O)
//!              │            │                │
//!              └──────┬─────┴────────┬───────┘
//!                     │  one TaskResult send each
//!                     ↓
//!              ┌──────────────┐      ┌─────────────────────────┐
//!              │ result chan  │ ←──close── watcher: TaskGroup  │
//!              └──────┬───────┘      │ wait() then drop sender │
//!                     │              └─────────────────────────┘
//!                     ↓
//!               ┌───────────┐
//!               │ Collector │  drain by count, or until disconnect
//!               └─────┬─────┘
//!                     ↓
//!               ┌─────────────┐
//!               │ BatchReport │  completion order + elapsed time
//!               └─────────────┘
//! ```
//!
//! # Module Structure
//!
//! ```text
//! src/engine/
//! ├── mod.rs          # Public API exports + architecture docs
//! ├── config.rs       # DispatchConfig, builder and tuning notes
//! ├── sync.rs         # TaskGroup counter + CompletionGuard
//! ├── signal.rs       # Single-shot ShutdownSignal / ShutdownToken
//! ├── worker.rs       # Fetch worker body + cancellable Poller loop
//! └── dispatcher.rs   # Dispatcher: fan-out, two drain strategies
//! ```
//!
//! # Example Usage
//!
//! ## One-shot batch, count-based drain:
//! ```ignore
//! let credential = Credential::from_env("OPENWEATHER_API_KEY")?;
//! let dispatcher = Dispatcher::new(client, credential, DispatchConfig::default())?;
//!
//! let report = dispatcher.dispatch(tasks_from_keys(cities))?;
//! for result in report.failures() {
//!     eprintln!("{}: {:?}", result.key, result.outcome);
//! }
//! println!("fetched {} in {:?}", report.success_count(), report.elapsed());
//! ```
//!
//! ## Close-based drain (count not needed up front):
//! ```ignore
//! let report = dispatcher.dispatch_drained(tasks)?;
//! ```
//!
//! ## Repeating background work with cooperative shutdown:
//! ```ignore
//! let poller = Poller::spawn(config.poll_interval, move || do_one_unit())?;
//! // ... later, on every exit path:
//! let report = poller.stop();
//! for err in &report.errors {
//!     eprintln!("poll iteration failed: {err:#}");
//! }
//! ```

// Module declarations
mod config;
mod dispatcher;
mod signal;
mod sync;
mod worker;

// Public re-exports
pub use config::{DispatchConfig, DispatchConfigBuilder};
pub use dispatcher::Dispatcher;
pub use signal::{shutdown_pair, ShutdownSignal, ShutdownToken};
pub use sync::{CompletionGuard, TaskGroup};
pub use worker::{Poller, PollerReport};
