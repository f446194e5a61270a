//! Outstanding-worker accounting for close-based shutdown.
//!
//! A [`TaskGroup`] is a counter of workers that have been launched but have
//! not yet finished. The dispatcher registers every worker before spawning
//! it, so each registration happens-before the matching decrement and a
//! waiter can never observe a premature zero. A single watcher blocks on
//! [`TaskGroup::wait`] and performs the channel close exactly once.
//!
//! Completion is released through an RAII [`CompletionGuard`]: normal
//! return, early return and panic unwinding all decrement exactly once, so a
//! crashed worker cannot leave the waiter blocked forever.

use std::sync::{Arc, Condvar, Mutex};

#[derive(Debug, Default)]
struct GroupState {
    outstanding: Mutex<usize>,
    all_done: Condvar,
}

/// Counter tracking workers that are still running.
///
/// Clones share the same counter. `complete()` called more times than
/// `register()` is a contract violation and panics rather than wrapping.
#[derive(Debug, Clone, Default)]
pub struct TaskGroup {
    state: Arc<GroupState>,
}

impl TaskGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one outstanding worker. Call before the worker starts.
    pub fn register(&self) {
        let mut outstanding = self.state.outstanding.lock().unwrap();
        *outstanding += 1;
    }

    /// Marks one registered worker as finished, waking waiters at zero.
    ///
    /// # Panics
    /// Panics if called more times than [`register`](Self::register).
    pub fn complete(&self) {
        let mut outstanding = self.state.outstanding.lock().unwrap();
        *outstanding = outstanding
            .checked_sub(1)
            .unwrap_or_else(|| panic!("TaskGroup completed more times than registered"));
        if *outstanding == 0 {
            self.state.all_done.notify_all();
        }
    }

    /// Registers one worker and returns the guard that completes it.
    pub fn register_guard(&self) -> CompletionGuard {
        self.register();
        CompletionGuard {
            group: self.clone(),
        }
    }

    /// Blocks until every registered worker has completed.
    ///
    /// Returns immediately when nothing is outstanding, including the
    /// zero-task batch.
    pub fn wait(&self) {
        let mut outstanding = self.state.outstanding.lock().unwrap();
        while *outstanding > 0 {
            outstanding = self.state.all_done.wait(outstanding).unwrap();
        }
    }

    #[cfg(test)]
    fn outstanding(&self) -> usize {
        *self.state.outstanding.lock().unwrap()
    }
}

/// Decrements its [`TaskGroup`] when dropped.
///
/// Handed to each worker thread; because the release rides on `Drop`, it
/// fires on every exit path, including unwinding after a panic in the fetch
/// body.
#[derive(Debug)]
pub struct CompletionGuard {
    group: TaskGroup,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.group.complete();
    }
}

#[cfg(test)]
mod task_group_tests {
    use super::*;

    #[test]
    fn register_and_complete_balance_out() {
        let group = TaskGroup::new();
        group.register();
        group.register();
        assert_eq!(group.outstanding(), 2);

        group.complete();
        group.complete();
        assert_eq!(group.outstanding(), 0);
        group.wait();
    }

    #[test]
    fn wait_returns_immediately_when_nothing_registered() {
        let group = TaskGroup::new();
        group.wait();
    }

    #[test]
    #[should_panic(expected = "completed more times than registered")]
    fn over_complete_panics() {
        let group = TaskGroup::new();
        group.complete();
    }

    #[test]
    fn guard_completes_on_drop() {
        let group = TaskGroup::new();
        let guard = group.register_guard();
        assert_eq!(group.outstanding(), 1);
        drop(guard);
        assert_eq!(group.outstanding(), 0);
    }

    #[test]
    fn guard_completes_during_unwind() {
        let group = TaskGroup::new();
        let guard = group.register_guard();

        let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = guard;
            panic!("worker body failed");
        }));

        assert!(unwound.is_err());
        assert_eq!(group.outstanding(), 0);
    }
}
