use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// The execution context allowed to write the sorted order. Recomputations
/// are posted here rather than run on the calling thread.
pub trait MainContext: Send + Sync {
    fn run(&self, task: Task);
}

/// Runs tasks immediately on the calling thread. Used before any main loop
/// exists, e.g. on a client with no world loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineContext;

impl MainContext for InlineContext {
    fn run(&self, task: Task) {
        task();
    }
}

/// Queues tasks until the owning main loop calls `run_pending`
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Arc<Mutex<VecDeque<Task>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every queued task, including ones queued by the tasks themselves.
    /// Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        loop {
            // guard must drop before the task runs, tasks may queue more
            let next = self.lock().pop_front();
            let Some(task) = next else {
                return count;
            };
            task();
            count += 1;
        }
    }

    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Task>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MainContext for TaskQueue {
    fn run(&self, task: Task) {
        self.lock().push_back(task);
    }
}
