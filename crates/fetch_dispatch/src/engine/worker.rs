//! Worker bodies: the one-shot fetch worker and the cancellable poll loop.
//!
//! The fetch worker runs one blocking lookup and performs exactly one send.
//! Skipping the send on failure would leave the collector under-counting
//! forever, so a fetch error is folded into the [`TaskResult`] instead.
//!
//! The [`Poller`] is the repeating-work variant: each iteration polls the
//! shutdown token without blocking (a `select!` with a `default` arm), runs
//! one unit of work, and sleeps the configured interval instead of spinning.
//! Iteration errors go out on a dedicated channel and come back from
//! [`Poller::stop`]; they are never silently discarded.

use anyhow::{Context, Result};
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::debug;

use super::signal::{shutdown_pair, ShutdownSignal};
use crate::fetch::{Credential, Fetch};
use crate::task::{Task, TaskResult};

/// Runs one task to completion: fetch, then exactly one send.
///
/// A send can only fail when the collector has abandoned the batch; the
/// result has nowhere to go and the worker just exits.
pub(crate) fn run_fetch<P, F>(
    task: Task,
    fetcher: &F,
    credential: &Credential,
    results: &Sender<TaskResult<P>>,
) where
    F: Fetch<P> + ?Sized,
{
    let id = task.id();
    let key = task.key().to_string();

    let outcome = fetcher
        .fetch(&key, credential.value())
        .with_context(|| format!("fetch failed for task {} (key {})", id, key));

    let result = TaskResult {
        task: id,
        key,
        outcome,
    };
    if results.send(result).is_err() {
        debug!(task = %id, "collector gone, dropping result");
    }
}

/// Outcome of a stopped [`Poller`]: how many iterations ran and every error
/// the body reported along the way.
#[derive(Debug)]
pub struct PollerReport {
    pub iterations: u64,
    pub errors: Vec<anyhow::Error>,
}

/// A worker thread repeating a unit of work until signaled to stop.
///
/// The signal and the join handle live inside the `Poller`, so the loop
/// cannot outlive its owning scope: [`stop`](Self::stop) signals and joins,
/// and dropping an unstopped `Poller` does the same.
#[derive(Debug)]
pub struct Poller {
    signal: Option<ShutdownSignal>,
    handle: Option<thread::JoinHandle<u64>>,
    errors: Receiver<anyhow::Error>,
}

impl Poller {
    /// Spawns the poll loop. `body` runs once per iteration; an `Err` is
    /// forwarded to the owner and the loop keeps going.
    pub fn spawn<F>(poll_interval: Duration, mut body: F) -> Result<Self>
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        let (signal, token) = shutdown_pair();
        let (err_tx, err_rx) = unbounded();

        let handle = thread::Builder::new()
            .name("dispatch-poller".to_string())
            .spawn(move || {
                let mut iterations = 0u64;
                loop {
                    // Non-blocking poll: the default arm falls through to the
                    // work unit when no signal is pending.
                    select! {
                        recv(token.receiver()) -> _ => break,
                        default => {}
                    }

                    if let Err(err) = body() {
                        // Owner gone means nobody is listening; keep looping
                        // until the signal (its drop) arrives.
                        let _ = err_tx.send(err);
                    }
                    iterations += 1;

                    thread::sleep(poll_interval);
                }
                debug!(iterations, "poller stopped");
                iterations
            })
            .context("failed to spawn poller thread")?;

        Ok(Self {
            signal: Some(signal),
            handle: Some(handle),
            errors: err_rx,
        })
    }

    /// Signals the loop, joins the thread and returns its report.
    pub fn stop(mut self) -> PollerReport {
        self.shutdown()
    }

    fn shutdown(&mut self) -> PollerReport {
        if let Some(signal) = self.signal.take() {
            signal.signal();
        }
        let iterations = match self.handle.take() {
            // A panicking body counts as zero completed iterations.
            Some(handle) => handle.join().unwrap_or(0),
            None => 0,
        };
        let errors = self.errors.try_iter().collect();
        PollerReport { iterations, errors }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown();
        }
    }
}
