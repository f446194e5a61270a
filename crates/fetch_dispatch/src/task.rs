use anyhow::Result;
use std::fmt;
use std::time::Duration;

/// Identifies one task within a batch.
///
/// Ids are assigned by the caller when building the batch and are carried
/// through to the matching [`TaskResult`], so results arriving in completion
/// order can still be traced back to the task that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(usize);

impl TaskId {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One unit of work: an id plus the lookup key handed to the fetch
/// collaborator.
///
/// Immutable once built. The dispatcher moves each `Task` into the worker
/// that runs it; nothing else reads it afterwards.
#[derive(Debug, Clone)]
pub struct Task {
    id: TaskId,
    key: String,
}

impl Task {
    pub fn new(id: usize, key: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(id),
            key: key.into(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Builds a batch of tasks from keys, assigning ids in input order.
pub fn tasks_from_keys<I, S>(keys: I) -> Vec<Task>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keys.into_iter()
        .enumerate()
        .map(|(id, key)| Task::new(id, key))
        .collect()
}

/// The single outcome a worker produces for its task.
///
/// Exactly one `TaskResult` exists per dispatched [`Task`]. A fetch failure
/// is data, not a batch abort: the error rides inside `outcome` and the
/// collector keeps draining. Ownership transfers to the collector on the
/// channel send; the worker must not touch the value afterwards.
#[derive(Debug)]
pub struct TaskResult<P> {
    pub task: TaskId,
    pub key: String,
    pub outcome: Result<P>,
}

impl<P> TaskResult<P> {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Aggregate of one dispatch-collect cycle.
///
/// Results appear in completion order, which is determined by external fetch
/// latency and is not the input order. `elapsed` is the wall-clock time from
/// fan-out to the last drained result.
#[derive(Debug)]
pub struct BatchReport<P> {
    results: Vec<TaskResult<P>>,
    elapsed: Duration,
}

impl<P> BatchReport<P> {
    pub(crate) fn new(results: Vec<TaskResult<P>>, elapsed: Duration) -> Self {
        Self { results, elapsed }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Results in completion order.
    pub fn results(&self) -> &[TaskResult<P>] {
        &self.results
    }

    pub fn into_results(self) -> Vec<TaskResult<P>> {
        self.results
    }

    pub fn successes(&self) -> impl Iterator<Item = &TaskResult<P>> {
        self.results.iter().filter(|r| r.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskResult<P>> {
        self.results.iter().filter(|r| r.is_failure())
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }
}

#[cfg(test)]
mod task_tests {
    use super::*;
    use anyhow::anyhow;

    fn report_with_one_failure() -> BatchReport<&'static str> {
        let results = vec![
            TaskResult {
                task: TaskId::new(0),
                key: "a".to_string(),
                outcome: Ok("payload-a"),
            },
            TaskResult {
                task: TaskId::new(1),
                key: "b".to_string(),
                outcome: Err(anyhow!("lookup failed")),
            },
            TaskResult {
                task: TaskId::new(2),
                key: "c".to_string(),
                outcome: Ok("payload-c"),
            },
        ];
        BatchReport::new(results, Duration::from_millis(5))
    }

    #[test]
    fn tasks_from_keys_assigns_sequential_ids() {
        let tasks = tasks_from_keys(["tokyo", "oslo"]);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id(), TaskId::new(0));
        assert_eq!(tasks[0].key(), "tokyo");
        assert_eq!(tasks[1].id(), TaskId::new(1));
        assert_eq!(tasks[1].key(), "oslo");
    }

    #[test]
    fn report_partitions_successes_and_failures() {
        let report = report_with_one_failure();
        assert_eq!(report.len(), 3);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);

        let failed: Vec<_> = report.failures().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].key, "b");
        assert!(failed[0]
            .outcome
            .as_ref()
            .err()
            .unwrap()
            .to_string()
            .contains("lookup failed"));
    }

    #[test]
    fn report_preserves_completion_order() {
        let report = report_with_one_failure();
        let keys: Vec<_> = report.results().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
