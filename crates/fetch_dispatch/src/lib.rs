pub mod engine;
pub mod fetch;
pub mod task;

pub use engine::{
    shutdown_pair, CompletionGuard, DispatchConfig, DispatchConfigBuilder, Dispatcher, Poller,
    PollerReport, ShutdownSignal, ShutdownToken, TaskGroup,
};
pub use fetch::{Credential, Fetch};
pub use task::{tasks_from_keys, BatchReport, Task, TaskId, TaskResult};
