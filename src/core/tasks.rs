//! Background jobs that fetch server data without blocking the UI loop.
//!
//! A job is split in two halves. `produce` runs on the Tokio pool and only
//! talks to the outside world; its value comes back through a single queue
//! and `consume` is applied to the state by whoever owns it (the UI loop),
//! one completion at a time. A failed `produce` never reaches `consume`: the
//! error goes to [`TaskErrorSink`] instead.

use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinError;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPriority {
    Normal,
    /// Taken from the queue ahead of waiting normal jobs. Best effort only:
    /// jobs already running are not interrupted.
    Preemptive,
}

pub type StateMutation<S> = Box<dyn FnOnce(&mut S) + Send>;

pub enum TaskOutcome<S> {
    Completed {
        label: &'static str,
        apply: StateMutation<S>,
    },
    Failed {
        label: &'static str,
        error: String,
    },
}

impl<S> TaskOutcome<S> {
    pub fn label(&self) -> &'static str {
        match self {
            TaskOutcome::Completed { label, .. } | TaskOutcome::Failed { label, .. } => label,
        }
    }
}

/// Where failed jobs are reported.
pub trait TaskErrorSink {
    fn report_task_error(&mut self, label: &str, error: &str);
}

/// A queued job. The label travels with it so a job that panics can still
/// be reported under its own name.
struct Job<S> {
    label: &'static str,
    future: Pin<Box<dyn Future<Output = TaskOutcome<S>> + Send>>,
}

/// Cloneable entry point for scheduling jobs.
pub struct TaskScheduler<S> {
    normal_tx: mpsc::UnboundedSender<Job<S>>,
    preemptive_tx: mpsc::UnboundedSender<Job<S>>,
}

impl<S> Clone for TaskScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            normal_tx: self.normal_tx.clone(),
            preemptive_tx: self.preemptive_tx.clone(),
        }
    }
}

impl<S: 'static> TaskScheduler<S> {
    pub fn schedule<T, E, P, Fut, C>(
        &self,
        label: &'static str,
        priority: TaskPriority,
        produce: P,
        consume: C,
    ) where
        P: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Display,
        C: FnOnce(&mut S, T) + Send + 'static,
    {
        let future = Box::pin(async move {
            match produce().await {
                Ok(value) => TaskOutcome::Completed {
                    label,
                    apply: Box::new(move |state: &mut S| consume(state, value)),
                },
                Err(err) => TaskOutcome::Failed {
                    label,
                    error: err.to_string(),
                },
            }
        });

        let job = Job { label, future };

        let queue = match priority {
            TaskPriority::Normal => &self.normal_tx,
            TaskPriority::Preemptive => &self.preemptive_tx,
        };
        debug!(label, ?priority, "scheduling task");
        if queue.send(job).is_err() {
            warn!(label, "task queue closed; dropping task");
        }
    }
}

/// Owns the completion queue. Lives with the state it mutates.
pub struct TaskRunner<S> {
    scheduler: TaskScheduler<S>,
    outcome_rx: mpsc::UnboundedReceiver<TaskOutcome<S>>,
}

impl<S: 'static> TaskRunner<S> {
    /// Starts the queue on the current Tokio runtime. At most `workers`
    /// jobs run at once.
    pub fn spawn(workers: usize) -> Self {
        let (normal_tx, normal_rx) = mpsc::unbounded_channel();
        let (preemptive_tx, preemptive_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_queue(
            preemptive_rx,
            normal_rx,
            outcome_tx,
            workers.max(1),
        ));

        Self {
            scheduler: TaskScheduler {
                normal_tx,
                preemptive_tx,
            },
            outcome_rx,
        }
    }

    pub fn scheduler(&self) -> TaskScheduler<S> {
        self.scheduler.clone()
    }

    pub async fn next_outcome(&mut self) -> Option<TaskOutcome<S>> {
        self.outcome_rx.recv().await
    }

    /// Applies every completion that is already waiting and returns how many
    /// were handled. Each one runs to the end before the next starts.
    pub fn apply_ready(&mut self, state: &mut S) -> usize
    where
        S: TaskErrorSink,
    {
        let mut handled = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            apply_outcome(state, outcome);
            handled += 1;
        }
        handled
    }
}

pub fn apply_outcome<S: TaskErrorSink>(state: &mut S, outcome: TaskOutcome<S>) {
    let label = outcome.label();
    match outcome {
        TaskOutcome::Completed { apply, .. } => {
            debug!(label, "applying task result");
            apply(state);
        }
        TaskOutcome::Failed { error, .. } => {
            warn!(label, %error, "task failed");
            state.report_task_error(label, &error);
        }
    }
}

fn panic_detail(err: JoinError) -> String {
    if !err.is_panic() {
        return format!("task aborted: {err}");
    }
    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|msg| msg.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("task panicked: {message}")
}

async fn run_queue<S: 'static>(
    mut preemptive_rx: mpsc::UnboundedReceiver<Job<S>>,
    mut normal_rx: mpsc::UnboundedReceiver<Job<S>>,
    outcome_tx: mpsc::UnboundedSender<TaskOutcome<S>>,
    workers: usize,
) {
    let permits = Arc::new(Semaphore::new(workers));
    loop {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let job = tokio::select! {
            biased;
            Some(job) = preemptive_rx.recv() => job,
            Some(job) = normal_rx.recv() => job,
            else => break,
        };

        let outcome_tx = outcome_tx.clone();
        tokio::spawn(async move {
            let Job { label, future } = job;
            let outcome = match tokio::spawn(future).await {
                Ok(outcome) => outcome,
                Err(err) => TaskOutcome::Failed {
                    label,
                    error: panic_detail(err),
                },
            };
            drop(permit);
            let _ = outcome_tx.send(outcome);
        });
    }
    debug!("task queue shut down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[derive(Default)]
    struct Counter {
        value: u32,
        order: Vec<&'static str>,
        errors: Vec<String>,
    }

    impl TaskErrorSink for Counter {
        fn report_task_error(&mut self, label: &str, error: &str) {
            self.errors.push(format!("{label}: {error}"));
        }
    }

    async fn drain(runner: &mut TaskRunner<Counter>, state: &mut Counter, count: usize) {
        for _ in 0..count {
            let outcome = runner.next_outcome().await.expect("outcome");
            apply_outcome(state, outcome);
        }
    }

    #[tokio::test]
    async fn completed_task_applies_consume() {
        let mut runner = TaskRunner::spawn(1);
        let mut state = Counter::default();

        runner.scheduler().schedule(
            "add",
            TaskPriority::Normal,
            || async { Ok::<_, String>(5) },
            |state: &mut Counter, value| state.value += value,
        );

        drain(&mut runner, &mut state, 1).await;
        assert_eq!(state.value, 5);
        assert!(state.errors.is_empty());
    }

    #[tokio::test]
    async fn failed_task_never_runs_consume() {
        let mut runner = TaskRunner::spawn(1);
        let mut state = Counter::default();

        runner.scheduler().schedule(
            "fetch users",
            TaskPriority::Preemptive,
            || async { Err::<u32, _>("connection refused") },
            |state: &mut Counter, value| state.value += value,
        );

        drain(&mut runner, &mut state, 1).await;
        assert_eq!(state.value, 0);
        assert_eq!(state.errors, vec!["fetch users: connection refused"]);
    }

    #[tokio::test]
    async fn preemptive_jobs_jump_the_queue() {
        let mut runner = TaskRunner::spawn(1);
        let scheduler = runner.scheduler();
        let mut state = Counter::default();

        let (started_tx, started_rx) = oneshot::channel();
        let (gate_tx, gate_rx) = oneshot::channel::<()>();
        scheduler.schedule(
            "first",
            TaskPriority::Normal,
            move || async move {
                let _ = started_tx.send(());
                let _ = gate_rx.await;
                Ok::<_, String>(())
            },
            |state: &mut Counter, _| state.order.push("first"),
        );
        started_rx.await.expect("first job started");

        scheduler.schedule(
            "normal",
            TaskPriority::Normal,
            || async { Ok::<_, String>(()) },
            |state: &mut Counter, _| state.order.push("normal"),
        );
        scheduler.schedule(
            "preemptive",
            TaskPriority::Preemptive,
            || async { Ok::<_, String>(()) },
            |state: &mut Counter, _| state.order.push("preemptive"),
        );
        gate_tx.send(()).expect("release first job");

        drain(&mut runner, &mut state, 3).await;
        assert_eq!(state.order, vec!["first", "preemptive", "normal"]);
    }

    #[tokio::test]
    async fn panicking_job_is_reported_as_failure() {
        let mut runner = TaskRunner::spawn(1);
        let mut state = Counter::default();

        runner.scheduler().schedule(
            "explode",
            TaskPriority::Normal,
            || async {
                if true {
                    panic!("boom");
                }
                Ok::<u32, String>(1)
            },
            |state: &mut Counter, value| state.value += value,
        );

        drain(&mut runner, &mut state, 1).await;
        assert_eq!(state.value, 0);
        assert_eq!(state.errors, vec!["explode: task panicked: boom"]);
    }

    #[test]
    fn outcome_label_covers_both_variants() {
        let done: TaskOutcome<Counter> = TaskOutcome::Completed {
            label: "send message",
            apply: Box::new(|_: &mut Counter| {}),
        };
        let failed: TaskOutcome<Counter> = TaskOutcome::Failed {
            label: "fetch users",
            error: "timeout".into(),
        };
        assert_eq!(done.label(), "send message");
        assert_eq!(failed.label(), "fetch users");
    }

    #[tokio::test]
    async fn apply_ready_drains_waiting_completions() {
        let mut runner = TaskRunner::spawn(2);
        let mut state = Counter::default();
        for value in [1, 2, 3] {
            runner.scheduler().schedule(
                "add",
                TaskPriority::Normal,
                move || async move { Ok::<_, String>(value) },
                |state: &mut Counter, value| state.value += value,
            );
        }

        let first = runner.next_outcome().await.expect("outcome");
        apply_outcome(&mut state, first);
        while state.value < 6 {
            tokio::task::yield_now().await;
            runner.apply_ready(&mut state);
        }
        assert_eq!(state.value, 6);
    }
}
