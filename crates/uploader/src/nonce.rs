//! Shared nonce allocation.

use tokio::sync::Mutex;

/// Hands out strictly increasing nonces to concurrent writers.
///
/// Each reservation belongs to exactly one transaction. A nonce is never
/// returned to the counter, even if its transaction later fails.
#[derive(Debug)]
pub struct NonceCounter {
    next: Mutex<u64>,
}

impl NonceCounter {
    /// Starts counting at `start`, normally the account's pending nonce.
    pub fn new(start: u64) -> Self {
        Self {
            next: Mutex::new(start),
        }
    }

    /// Reserves the next nonce.
    pub async fn reserve(&self) -> u64 {
        let mut next = self.next.lock().await;
        let nonce = *next;
        *next += 1;
        nonce
    }

    /// The nonce the next reservation will return.
    pub async fn peek(&self) -> u64 {
        *self.next.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn sequential_reservations_increment() {
        let counter = NonceCounter::new(7);
        assert_eq!(counter.reserve().await, 7);
        assert_eq!(counter.reserve().await, 8);
        assert_eq!(counter.peek().await, 9);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reservations_are_unique_and_gapless() {
        let counter = Arc::new(NonceCounter::new(100));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let mut mine = Vec::new();
                for _ in 0..25 {
                    mine.push(counter.reserve().await);
                    tokio::task::yield_now().await;
                }
                mine
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for nonce in handle.await.unwrap() {
                assert!(seen.insert(nonce), "nonce {nonce} handed out twice");
            }
        }
        assert_eq!(seen.len(), 400);
        assert_eq!(*seen.iter().min().unwrap(), 100);
        assert_eq!(*seen.iter().max().unwrap(), 499);
    }
}
