use crate::state::CrawlState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of failed states retained per crawl
pub const DEFAULT_FAILURE_CAPACITY: usize = 100;

/// Bounded buffer of states whose processing failed
///
/// Shared by every worker in a wave. Insertion past capacity is dropped and
/// only counted; dropped states are neither retried nor checkpointed.
#[derive(Debug)]
pub struct FailureQueue {
    entries: Mutex<Vec<CrawlState>>,
    capacity: usize,
    dropped: AtomicUsize,
}

impl FailureQueue {
    /// Creates an empty queue holding at most `capacity` states
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            dropped: AtomicUsize::new(0),
        }
    }

    /// Records a failed state
    ///
    /// Returns `false` if the queue was full and the state was dropped.
    pub fn push(&self, state: CrawlState) -> bool {
        let mut entries = self.lock();
        if entries.len() >= self.capacity {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        entries.push(state);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of states dropped because the queue was full
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Returns a copy of the queued states without draining them
    pub fn snapshot(&self) -> Vec<CrawlState> {
        self.lock().clone()
    }

    // A worker that panicked mid-push leaves the Vec intact, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Vec<CrawlState>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FailureQueue {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_CAPACITY)
    }
}
