//! Deadline queue for timed callbacks.
//!
//! Engines schedule an action at an absolute time and the caller drains due
//! actions from `tick()`. Actions due at the same instant come out in the
//! order they were scheduled.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Entry<T: Ord> {
    due_ms: u64,
    seq: u64,
    action: T,
}

/// Pending timed actions ordered by due time.
#[derive(Debug, Clone)]
pub struct Scheduler<T: Ord> {
    queue: BinaryHeap<Reverse<Entry<T>>>,
    next_seq: u64,
}

impl<T: Ord> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<T: Ord> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to fire at `due_ms`.
    pub fn schedule(&mut self, due_ms: u64, action: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry {
            due_ms,
            seq,
            action,
        }));
    }

    /// Pop the earliest action due at or before `now_ms`, with its due time.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, T)> {
        match self.queue.peek() {
            Some(Reverse(entry)) if entry.due_ms <= now_ms => {}
            _ => return None,
        }
        self.queue
            .pop()
            .map(|Reverse(entry)| (entry.due_ms, entry.action))
    }

    /// Earliest pending due time.
    pub fn next_due(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(entry)| entry.due_ms)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every pending action.
    pub fn cancel_all(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_due_order() {
        let mut s = Scheduler::new();
        s.schedule(300, "c");
        s.schedule(100, "a");
        s.schedule(200, "b");
        assert_eq!(s.pop_due(50), None);
        assert_eq!(s.pop_due(1_000), Some((100, "a")));
        assert_eq!(s.pop_due(1_000), Some((200, "b")));
        assert_eq!(s.pop_due(1_000), Some((300, "c")));
        assert!(s.is_empty());
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut s = Scheduler::new();
        s.schedule(100, 2u8);
        s.schedule(100, 1u8);
        assert_eq!(s.pop_due(100), Some((100, 2)));
        assert_eq!(s.pop_due(100), Some((100, 1)));
    }

    #[test]
    fn cancel_all_clears_queue() {
        let mut s = Scheduler::new();
        s.schedule(10, 1u8);
        s.schedule(20, 2u8);
        assert_eq!(s.next_due(), Some(10));
        s.cancel_all();
        assert_eq!(s.pop_due(u64::MAX), None);
        assert_eq!(s.next_due(), None);
    }
}
