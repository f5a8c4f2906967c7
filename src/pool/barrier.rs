//! Completion barrier
//!
//! A countdown latch: created for a known number of participants, released
//! once every participant has arrived. Waiters block on a condition variable,
//! never spin.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Releases waiters once `total` arrivals have been recorded
pub struct CompletionBarrier {
    remaining: Mutex<usize>,
    released: Condvar,
    total: usize,
}

impl CompletionBarrier {
    /// Create a barrier expecting `total` arrivals (0 = already released)
    pub fn new(total: usize) -> Self {
        Self {
            remaining: Mutex::new(total),
            released: Condvar::new(),
            total,
        }
    }

    /// Record one arrival. Arrivals beyond `total` are ignored.
    pub fn arrive(&self) {
        let mut remaining = self.remaining.lock();
        if *remaining == 0 {
            return;
        }
        *remaining -= 1;
        if *remaining == 0 {
            self.released.notify_all();
        }
    }

    /// Block until every participant has arrived
    pub fn wait(&self) {
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            self.released.wait(&mut remaining);
        }
    }

    /// Block until released or `timeout` elapses. Returns true if released.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            if self.released.wait_until(&mut remaining, deadline).timed_out() {
                return *remaining == 0;
            }
        }
        true
    }

    /// Participants that have not arrived yet
    pub fn remaining(&self) -> usize {
        *self.remaining.lock()
    }

    /// Participants that have arrived
    pub fn arrived(&self) -> usize {
        self.total - self.remaining()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_zero_participants_is_released() {
        let barrier = CompletionBarrier::new(0);
        assert!(barrier.is_released());
        barrier.wait();
        assert!(barrier.wait_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn test_arrivals_count_down() {
        let barrier = CompletionBarrier::new(3);
        barrier.arrive();
        assert_eq!(barrier.remaining(), 2);
        assert_eq!(barrier.arrived(), 1);
        barrier.arrive();
        barrier.arrive();
        assert!(barrier.is_released());

        // Extra arrivals do not underflow
        barrier.arrive();
        assert_eq!(barrier.remaining(), 0);
        assert_eq!(barrier.arrived(), 3);
    }

    #[test]
    fn test_wait_timeout_expires() {
        let barrier = CompletionBarrier::new(2);
        barrier.arrive();
        assert!(!barrier.wait_timeout(Duration::from_millis(20)));
        assert_eq!(barrier.remaining(), 1);
    }

    #[test]
    fn test_wait_released_by_other_threads() {
        let barrier = Arc::new(CompletionBarrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let b = Arc::clone(&barrier);
                thread::spawn(move || b.arrive())
            })
            .collect();

        assert!(barrier.wait_timeout(Duration::from_secs(10)));
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(barrier.arrived(), 8);
    }
}
