//! Task handles
//!
//! Every submitted task gets a slot shared between the job running on a pool
//! thread and the `TaskHandle` returned to the submitter. The job fills the
//! slot exactly once; the handle blocks on the slot's condition variable.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use super::barrier::CompletionBarrier;
use crate::utils::TaskFailure;

pub type Outcome<T> = std::result::Result<T, TaskFailure>;

struct SlotState<T> {
    outcome: Option<Outcome<T>>,
    finished: bool,
    /// Barriers to notify on completion (attached by `await_all`)
    watchers: Vec<Arc<CompletionBarrier>>,
}

pub(crate) struct TaskSlot<T> {
    state: Mutex<SlotState<T>>,
    done: Condvar,
}

impl<T> TaskSlot<T> {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                outcome: None,
                finished: false,
                watchers: Vec::new(),
            }),
            done: Condvar::new(),
        }
    }

    /// Store the task outcome and wake every waiter
    pub(crate) fn complete(&self, outcome: Outcome<T>) {
        let watchers = {
            let mut state = self.state.lock();
            state.outcome = Some(outcome);
            state.finished = true;
            std::mem::take(&mut state.watchers)
        };
        self.done.notify_all();
        for barrier in watchers {
            barrier.arrive();
        }
    }
}

/// Handle to a task submitted to a [`WorkerPool`](super::WorkerPool)
pub struct TaskHandle<T> {
    id: u64,
    slot: Arc<TaskSlot<T>>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(id: u64) -> (Self, Arc<TaskSlot<T>>) {
        let slot = Arc::new(TaskSlot::new());
        (
            Self {
                id,
                slot: Arc::clone(&slot),
            },
            slot,
        )
    }

    /// Pool-wide task id, assigned in submission order
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the task has finished, panicked, or been discarded by `detach`
    pub fn is_finished(&self) -> bool {
        self.slot.state.lock().finished
    }

    /// Block until the task finishes and return its output
    pub fn wait(self) -> Outcome<T> {
        let mut state = self.slot.state.lock();
        while !state.finished {
            self.slot.done.wait(&mut state);
        }
        state
            .outcome
            .take()
            .unwrap_or_else(|| unreachable!("task slot finished without an outcome"))
    }

    /// Arrive on `barrier` when this task finishes (immediately if it already has)
    pub(crate) fn notify_on_completion(&self, barrier: &Arc<CompletionBarrier>) {
        let mut state = self.slot.state.lock();
        if state.finished {
            drop(state);
            barrier.arrive();
        } else {
            state.watchers.push(Arc::clone(barrier));
        }
    }
}

impl<T> std::fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("finished", &self.is_finished())
            .finish()
    }
}
