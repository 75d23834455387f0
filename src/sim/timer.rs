//! Time-ordered deferred actions with cancellation
//!
//! Actions are keyed on real (unscaled) seconds. Cancelled entries stay in the
//! heap and are skipped when they surface.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Handle to a scheduled action, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<A> {
    due: f64,
    seq: u64,
    action: A,
}

impl<A> PartialEq for Entry<A> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<A> Eq for Entry<A> {}

impl<A> PartialOrd for Entry<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for Entry<A> {
    // Reversed so the max-heap pops the earliest due (then earliest scheduled)
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of pending actions
#[derive(Debug)]
pub struct DeferredQueue<A> {
    heap: BinaryHeap<Entry<A>>,
    pending: HashSet<u64>,
    next_seq: u64,
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> DeferredQueue<A> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            pending: HashSet::new(),
            next_seq: 0,
        }
    }

    /// Schedule `action` to fire once the clock reaches `due`
    pub fn schedule(&mut self, due: f64, action: A) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { due, seq, action });
        self.pending.insert(seq);
        TimerId(seq)
    }

    /// Cancel a pending action. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id.0)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.contains(&id.0)
    }

    /// Pop the next live action due at or before `now`
    pub fn pop_due(&mut self, now: f64) -> Option<A> {
        while let Some(top) = self.heap.peek() {
            if !self.pending.contains(&top.seq) {
                self.heap.pop();
                continue;
            }
            if top.due > now {
                return None;
            }
            let entry = self.heap.pop()?;
            self.pending.remove(&entry.seq);
            return Some(entry.action);
        }
        None
    }

    /// Number of live (uncancelled) actions
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.pending.clear();
    }
}
