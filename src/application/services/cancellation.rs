use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::JobId;

/// Job-level cancellation signal shared by the request layer and workers.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Flags of jobs that are queued or running.
#[derive(Debug, Default)]
pub struct CancellationRegistry {
    flags: Mutex<HashMap<JobId, CancellationFlag>>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, job_id: JobId) -> CancellationFlag {
        let flag = CancellationFlag::new();
        self.lock().insert(job_id, flag.clone());
        flag
    }

    /// Returns false when the job has no live flag.
    pub fn cancel(&self, job_id: JobId) -> bool {
        self.lock()
            .get(&job_id)
            .map(CancellationFlag::cancel)
            .is_some()
    }

    pub fn remove(&self, job_id: JobId) {
        self.lock().remove(&job_id);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, CancellationFlag>> {
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
