//! # Per-class FIFO request queues.
//!
//! One unbounded `VecDeque` per enumerated [`PriorityClass`], indexed by
//! dense rank. Only the dispatcher touches these; thread-safety is the
//! submission channel's job.
//!
//! ## Rules
//! - Push/pop are O(1); order within a class is submission order.
//! - `backlog()` snapshots all lengths for the admission split.

use std::collections::VecDeque;

use crate::copies::CopyRequest;
use crate::priority::PriorityClass;

/// The dispatcher's per-class pending queues.
pub(crate) struct ClassQueues {
    queues: Vec<VecDeque<CopyRequest>>,
}

impl ClassQueues {
    /// One empty queue per enumerated class.
    pub(crate) fn new() -> Self {
        let mut queues = Vec::with_capacity(PriorityClass::COUNT);
        queues.resize_with(PriorityClass::COUNT, VecDeque::new);
        Self { queues }
    }

    /// Appends a request to its class queue.
    pub(crate) fn push(&mut self, request: CopyRequest) {
        self.queues[request.class.index()].push_back(request);
    }

    /// Pops the oldest request of a class.
    pub(crate) fn pop(&mut self, class: PriorityClass) -> Option<CopyRequest> {
        self.queues[class.index()].pop_front()
    }

    /// Pending requests in one class.
    pub(crate) fn len(&self, class: PriorityClass) -> usize {
        self.queues[class.index()].len()
    }

    /// Pending requests across all classes.
    pub(crate) fn total_len(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    /// True when no class has pending work.
    pub(crate) fn is_empty(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
    }

    /// Length snapshot, indexed by class rank; input to the admission split.
    pub(crate) fn backlog(&self) -> Vec<u32> {
        self.queues.iter().map(|q| q.len() as u32).collect()
    }

    /// Empties every queue, yielding requests in class order (FIFO within
    /// a class). Used by the shutdown drain.
    pub(crate) fn drain_all(&mut self) -> Vec<CopyRequest> {
        let mut drained = Vec::with_capacity(self.total_len());
        for queue in &mut self.queues {
            drained.extend(queue.drain(..));
        }
        drained
    }
}
