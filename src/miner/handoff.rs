// src/miner/handoff.rs
//! Single-slot, most-recent-wins handoff between a Listener and its Miner
//!
//! Not a queue: publishing replaces whatever is still undelivered, and a
//! take empties the slot. Both operations are one atomic pointer swap, so
//! the Miner can poll on every hash attempt without locking.

use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// Latest-value cell
pub struct Handoff<T> {
    slot: ArcSwapOption<T>,
}

impl<T> Handoff<T> {
    /// Creates an empty handoff
    pub fn new() -> Self {
        Handoff {
            slot: ArcSwapOption::empty(),
        }
    }

    /// Stores `value`, replacing any undelivered one
    ///
    /// # Returns
    /// `true` if an undelivered value was overwritten
    pub fn publish(&self, value: T) -> bool {
        self.slot.swap(Some(Arc::new(value))).is_some()
    }

    /// Removes and returns the newest value, if any. Never blocks.
    pub fn take(&self) -> Option<Arc<T>> {
        self.slot.swap(None)
    }

    /// Whether a value is waiting to be taken
    pub fn is_pending(&self) -> bool {
        self.slot.load().is_some()
    }
}

impl<T: Clone> Handoff<T> {
    /// Takes the newest value as an owned copy
    ///
    /// The Listener drops its reference on publish, so this is normally a
    /// move; a clone only happens if someone else still holds the `Arc`.
    pub fn take_owned(&self) -> Option<T> {
        self.take()
            .map(|value| Arc::try_unwrap(value).unwrap_or_else(|shared| (*shared).clone()))
    }
}

impl<T> Default for Handoff<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_empty_take_returns_none() {
        let handoff: Handoff<u32> = Handoff::new();
        assert!(!handoff.is_pending());
        assert!(handoff.take().is_none());
    }

    #[test]
    fn test_latest_value_wins() {
        let handoff = Handoff::new();
        assert!(!handoff.publish("a"));
        assert!(handoff.publish("b"));
        assert!(handoff.is_pending());
        assert_eq!(handoff.take_owned(), Some("b"));
        assert!(handoff.take().is_none());
    }

    #[test]
    fn test_value_is_delivered_once() {
        let handoff = Handoff::new();
        handoff.publish(7u64);
        assert_eq!(handoff.take_owned(), Some(7));
        assert_eq!(handoff.take_owned(), None);
    }

    #[test]
    fn test_cross_thread_publish_is_seen_in_order() {
        let handoff = Arc::new(Handoff::new());
        let producer = {
            let handoff = handoff.clone();
            thread::spawn(move || {
                for i in 0..10_000u64 {
                    handoff.publish(i);
                }
            })
        };

        let mut last_seen = None;
        loop {
            if let Some(value) = handoff.take_owned() {
                if let Some(prev) = last_seen {
                    assert!(value > prev, "went backwards: {value} after {prev}");
                }
                last_seen = Some(value);
                if value == 9_999 {
                    break;
                }
            }
        }
        producer.join().unwrap();
        assert!(!handoff.is_pending());
    }
}
