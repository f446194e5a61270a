//! The dispatch-collect orchestrator.
//!
//! One `Dispatcher` owns the fetch collaborator, the credential and the
//! tuning knobs; each call to [`dispatch`](Dispatcher::dispatch) or
//! [`dispatch_drained`](Dispatcher::dispatch_drained) runs a complete
//! fan-out / collect / shutdown cycle:
//!
//! `Idle -> Dispatching (workers launched) -> Collecting (results arriving)
//! -> Drained (count reached or channel disconnected) -> Done`
//!
//! Workers run concurrently with collection, so Dispatching and Collecting
//! interleave freely. Results land in completion order; the only ordering
//! guarantee is the channel's own FIFO.

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::marker::PhantomData;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

use super::config::DispatchConfig;
use super::sync::TaskGroup;
use super::worker;
use crate::fetch::{Credential, Fetch};
use crate::task::{BatchReport, Task, TaskResult};

/// Fan-out/fan-in coordinator for batches of fetch tasks.
///
/// # Type parameters
/// - `P`: payload produced by a successful fetch
/// - `F`: the fetch collaborator, shared across workers via `Arc`
pub struct Dispatcher<P, F> {
    fetcher: Arc<F>,
    credential: Credential,
    config: DispatchConfig,
    _payload: PhantomData<fn() -> P>,
}

impl<P, F> Dispatcher<P, F>
where
    P: Send + 'static,
    F: Fetch<P> + 'static,
{
    /// Creates a dispatcher.
    ///
    /// The credential is a precondition: callers load it (see
    /// [`Credential::from_env`](crate::fetch::Credential::from_env)) before a
    /// dispatcher exists, so a missing key aborts before any worker launch.
    pub fn new(fetcher: F, credential: Credential, config: DispatchConfig) -> Result<Self> {
        if config.thread_name_prefix.is_empty() {
            return Err(anyhow!("thread_name_prefix must not be empty"));
        }
        if config.collect_timeout.is_zero() {
            return Err(anyhow!(
                "collect_timeout must be non-zero; the collector would give up \
                before any worker could respond"
            ));
        }

        Ok(Self {
            fetcher: Arc::new(fetcher),
            credential,
            config,
            _payload: PhantomData,
        })
    }

    /// Dispatches a batch and collects by count.
    ///
    /// Launches one worker per task, then receives exactly `tasks.len()`
    /// results. Error-tagged results are recorded and collection continues;
    /// partial failure never aborts the batch.
    pub fn dispatch(&self, tasks: Vec<Task>) -> Result<BatchReport<P>> {
        let expected = tasks.len();
        let started = Instant::now();
        debug!(tasks = expected, "dispatching batch (count-based drain)");

        let (results_tx, results_rx) = bounded(self.config.channel_capacity);

        let mut handles = Vec::with_capacity(expected);
        for task in tasks {
            handles.push(self.spawn_worker(task, results_tx.clone())?);
        }
        // Workers hold the only remaining senders.
        drop(results_tx);

        let mut results = Vec::with_capacity(expected);
        for received in 0..expected {
            let result = results_rx
                .recv_timeout(self.config.collect_timeout)
                .map_err(|err| match err {
                    RecvTimeoutError::Timeout => anyhow!(
                        "timed out after {:?} waiting for result {}/{} - a worker \
                        may be stuck or have panicked",
                        self.config.collect_timeout,
                        received + 1,
                        expected
                    ),
                    RecvTimeoutError::Disconnected => anyhow!(
                        "result channel disconnected after {} of {} results - \
                        workers exited without sending",
                        received,
                        expected
                    ),
                })?;
            record(&result);
            results.push(result);
        }

        for handle in handles {
            let _ = handle.join();
        }

        let elapsed = started.elapsed();
        debug!(results = results.len(), ?elapsed, "batch drained");
        Ok(BatchReport::new(results, elapsed))
    }

    /// Dispatches a batch and collects until the channel closes.
    ///
    /// Every worker is registered with a [`TaskGroup`] before it starts and
    /// completes through a guard on every exit path. A watcher thread blocks
    /// on `wait()` and then drops the final sender - the one close, performed
    /// exactly once, after all workers have finished. The collector drains
    /// buffered results and stops at disconnection, so it never needs the
    /// count up front and survives a worker that died without sending.
    pub fn dispatch_drained(&self, tasks: Vec<Task>) -> Result<BatchReport<P>> {
        let expected = tasks.len();
        let started = Instant::now();
        debug!(tasks = expected, "dispatching batch (close-based drain)");

        let group = TaskGroup::new();
        let (results_tx, results_rx) = bounded(self.config.channel_capacity);

        let mut handles = Vec::with_capacity(expected);
        for task in tasks {
            // Register before spawn: the registration happens-before the
            // worker's decrement, so the watcher cannot see zero early.
            let guard = group.register_guard();
            let fetcher = Arc::clone(&self.fetcher);
            let credential = self.credential.clone();
            let results = results_tx.clone();
            let name = format!("{}-worker-{}", self.config.thread_name_prefix, task.id());
            let handle = thread::Builder::new()
                .name(name)
                .spawn(move || {
                    let _guard = guard;
                    worker::run_fetch(task, fetcher.as_ref(), &credential, &results);
                })
                .context("failed to spawn dispatch worker")?;
            handles.push(handle);
        }

        let watcher = {
            let group = group.clone();
            thread::Builder::new()
                .name(format!("{}-watcher", self.config.thread_name_prefix))
                .spawn(move || {
                    group.wait();
                    // Dropping the dispatcher's sender is the close. Workers
                    // have already performed their sends by the time wait()
                    // returns; once their clones are gone too the receiver
                    // drains any buffer and disconnects.
                    drop(results_tx);
                })
                .context("failed to spawn dispatch watcher")?
        };

        let mut results = Vec::with_capacity(expected);
        loop {
            match results_rx.recv_timeout(self.config.collect_timeout) {
                Ok(result) => {
                    record(&result);
                    results.push(result);
                }
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(anyhow!(
                        "timed out after {:?} draining results ({} received) - a \
                        worker may be stuck",
                        self.config.collect_timeout,
                        results.len()
                    ));
                }
            }
        }

        let _ = watcher.join();
        for handle in handles {
            let _ = handle.join();
        }

        let elapsed = started.elapsed();
        debug!(results = results.len(), ?elapsed, "batch drained");
        Ok(BatchReport::new(results, elapsed))
    }

    fn spawn_worker(
        &self,
        task: Task,
        results: crossbeam_channel::Sender<TaskResult<P>>,
    ) -> Result<thread::JoinHandle<()>> {
        let fetcher = Arc::clone(&self.fetcher);
        let credential = self.credential.clone();
        let name = format!("{}-worker-{}", self.config.thread_name_prefix, task.id());
        thread::Builder::new()
            .name(name)
            .spawn(move || worker::run_fetch(task, fetcher.as_ref(), &credential, &results))
            .context("failed to spawn dispatch worker")
    }
}

fn record<P>(result: &TaskResult<P>) {
    if let Err(err) = &result.outcome {
        warn!(task = %result.task, key = %result.key, error = %err, "task failed");
    }
}
