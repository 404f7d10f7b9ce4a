use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::domain::Task;

use super::CancellationFlag;

#[async_trait]
pub trait TaskHandler: Send + Sync + 'static {
    /// Runs one task and optionally returns a follow-up task for the same
    /// chunk, which is queued ahead of every task that has not started.
    async fn handle(&self, task: Task) -> Option<Task>;
}

struct QueueState {
    pending: VecDeque<Task>,
    in_flight: usize,
}

/// Shared FIFO of unstarted tasks. Drained once nothing is pending and no
/// running task can produce a follow-up.
pub struct TaskQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

/// A task checked out of the queue. Dropping it, including during a panic
/// in the handler, marks the task finished.
pub struct Lease<'a> {
    queue: &'a TaskQueue,
    pub task: Task,
    follow_up: Option<Task>,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.queue.finish(self.follow_up.take());
    }
}

impl TaskQueue {
    pub fn new(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                pending: tasks.into_iter().collect(),
                in_flight: 0,
            }),
            notify: Notify::new(),
        }
    }

    pub async fn next(&self) -> Option<Lease<'_>> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(task) = state.pending.pop_front() {
                    state.in_flight += 1;
                    return Some(Lease {
                        queue: self,
                        task,
                        follow_up: None,
                    });
                }
                if state.in_flight == 0 {
                    return None;
                }
            }

            notified.await;
        }
    }

    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    fn finish(&self, follow_up: Option<Task>) {
        {
            let mut state = self.lock();
            state.in_flight -= 1;
            if let Some(task) = follow_up {
                state.pending.push_front(task);
            }
        }
        self.notify.notify_waiters();
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fixed number of workers pulling from one shared queue. A worker takes
/// the next unstarted task as soon as it finishes one.
pub struct WorkerPool {
    worker_count: usize,
}

impl WorkerPool {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Runs until the queue drains or `cancel` is observed between tasks.
    pub async fn run<H: TaskHandler>(
        &self,
        tasks: Vec<Task>,
        handler: Arc<H>,
        cancel: &CancellationFlag,
    ) {
        let queue = Arc::new(TaskQueue::new(tasks));
        let mut workers = JoinSet::new();

        for worker_id in 0..self.worker_count {
            let queue = Arc::clone(&queue);
            let handler = Arc::clone(&handler);
            let cancel = cancel.clone();

            workers.spawn(
                async move {
                    let mut handled = 0usize;
                    while !cancel.is_cancelled() {
                        let Some(mut lease) = queue.next().await else {
                            break;
                        };
                        if cancel.is_cancelled() {
                            break;
                        }
                        lease.follow_up = handler.handle(lease.task).await;
                        handled += 1;
                    }
                    tracing::debug!(handled, "Worker stopped");
                }
                .instrument(tracing::debug_span!("worker", worker_id)),
            );
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Worker aborted");
            }
        }

        if cancel.is_cancelled() {
            tracing::info!(
                abandoned_tasks = queue.pending(),
                "Worker pool stopped after cancellation"
            );
        }
    }
}
