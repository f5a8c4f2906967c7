//! The contended counter
//!
//! This is the ONLY state shared between campaign tasks. How an increment is
//! performed depends on the campaign's [`SyncMode`]; the counter itself never
//! changes mode after creation.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::sync_mode::SyncMode;

/// Counter shared by every task of a campaign
pub enum SharedCounter {
    /// Separate load and store: concurrent increments can overwrite each other
    Racy(AtomicU64),
    /// Each increment holds the lock for exactly one `+= 1`
    Locked(Mutex<u64>),
    /// Each increment is a single `fetch_add`
    Atomic(AtomicU64),
}

impl SharedCounter {
    /// Create a counter at zero for the given mode
    pub fn new(mode: SyncMode) -> Self {
        match mode {
            SyncMode::Unsynchronized => Self::Racy(AtomicU64::new(0)),
            SyncMode::Mutex => Self::Locked(Mutex::new(0)),
            SyncMode::Atomic => Self::Atomic(AtomicU64::new(0)),
        }
    }

    pub fn mode(&self) -> SyncMode {
        match self {
            Self::Racy(_) => SyncMode::Unsynchronized,
            Self::Locked(_) => SyncMode::Mutex,
            Self::Atomic(_) => SyncMode::Atomic,
        }
    }

    /// Add one to the counter
    #[inline]
    pub fn increment(&self) {
        match self {
            Self::Racy(cell) => {
                // Separate load and store: an update from another thread that
                // lands in between is overwritten.
                let current = cell.load(Ordering::Relaxed);
                cell.store(current.wrapping_add(1), Ordering::Relaxed);
            }
            Self::Locked(lock) => {
                *lock.lock() += 1;
            }
            Self::Atomic(cell) => {
                cell.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Perform `count` individual increments
    #[inline]
    pub fn increment_n(&self, count: u64) {
        for _ in 0..count {
            self.increment();
        }
    }

    /// Current value
    ///
    /// Only meaningful once every task has passed the completion barrier,
    /// which orders this read after the last increment.
    pub fn value(&self) -> u64 {
        match self {
            Self::Racy(cell) | Self::Atomic(cell) => cell.load(Ordering::Relaxed),
            Self::Locked(lock) => *lock.lock(),
        }
    }
}

impl std::fmt::Debug for SharedCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCounter")
            .field("mode", &self.mode())
            .field("value", &self.value())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn hammer(counter: &Arc<SharedCounter>, threads: usize, per_thread: u64) {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let c = Arc::clone(counter);
                thread::spawn(move || c.increment_n(per_thread))
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
    }

    #[test]
    fn test_new_counter_is_zero() {
        for mode in SyncMode::ALL {
            let counter = SharedCounter::new(mode);
            assert_eq!(counter.value(), 0);
            assert_eq!(counter.mode(), mode);
        }
    }

    #[test]
    fn test_single_thread_is_exact_in_every_mode() {
        for mode in SyncMode::ALL {
            let counter = SharedCounter::new(mode);
            counter.increment_n(10_000);
            assert_eq!(counter.value(), 10_000, "mode {}", mode);
        }
    }

    #[test]
    fn test_mutex_concurrent_increments() {
        let counter = Arc::new(SharedCounter::new(SyncMode::Mutex));
        hammer(&counter, 8, 20_000);
        assert_eq!(counter.value(), 160_000);
    }

    #[test]
    fn test_atomic_concurrent_increments() {
        let counter = Arc::new(SharedCounter::new(SyncMode::Atomic));
        hammer(&counter, 8, 20_000);
        assert_eq!(counter.value(), 160_000);
    }

    #[test]
    fn test_racy_never_exceeds_expected() {
        let counter = Arc::new(SharedCounter::new(SyncMode::Unsynchronized));
        hammer(&counter, 4, 100_000);
        let value = counter.value();
        assert!(value > 0);
        assert!(value <= 400_000);
    }

    #[test]
    fn test_mutex_released_after_panic() {
        let counter = Arc::new(SharedCounter::new(SyncMode::Mutex));

        let c = Arc::clone(&counter);
        let result = thread::spawn(move || {
            c.increment();
            panic!("task failed after incrementing");
        })
        .join();
        assert!(result.is_err());

        // Lock is free again and not poisoned
        counter.increment();
        assert_eq!(counter.value(), 2);
    }
}
