// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! The two queue shapes the engine runs on.
//!
//! [`Queue`] is a plain FIFO for outgoing messages produced off the main
//! request/response path. [`NamedQueue`] holds at most one pending payload
//! per logical name, collapsing bursts of redundant work (rapid document
//! edits) down to the latest state per name.

use std::collections::VecDeque;

/// Strict FIFO queue of outgoing work.
#[derive(Debug)]
pub struct Queue<T> {
    items: VecDeque<T>,
}

impl<T> Queue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Appends an item at the back.
    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Removes and returns the front item.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Returns true when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Coalescing queue: at most one pending payload per name.
///
/// `put` under an existing name replaces the payload in place, keeping the
/// name's original position, so drain order is first-inserted-name-first
/// regardless of later replacements. Linear scans are fine at editor
/// message rates.
#[derive(Debug)]
pub struct NamedQueue<T> {
    entries: Vec<(String, T)>,
}

impl<T> NamedQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Upserts `payload` under `name`. An existing entry keeps its slot.
    pub fn put(&mut self, name: impl Into<String>, payload: T) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = payload;
        } else {
            self.entries.push((name, payload));
        }
    }

    /// Atomically removes and returns every pending payload, in
    /// first-inserted-name order.
    pub fn drain_all(&mut self) -> Vec<T> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .map(|(_, payload)| payload)
            .collect()
    }

    /// Returns true when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct pending names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<T> Default for NamedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_fifo() {
        let mut q = Queue::new();
        q.push(1);
        q.push(2);
        q.push(3);
        assert_eq!(q.len(), 3);
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), Some(3));
        assert_eq!(q.pop(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn coalesce_same_name_keeps_latest_payload() {
        let mut q = NamedQueue::new();
        q.put("doc", "P1");
        q.put("doc", "P2");
        q.put("doc", "P3");
        assert_eq!(q.len(), 1);
        assert_eq!(q.drain_all(), vec!["P3"]);
        assert!(q.is_empty());
    }

    #[test]
    fn distinct_names_each_keep_latest() {
        let mut q = NamedQueue::new();
        q.put("a", 1);
        q.put("b", 2);
        q.put("c", 3);
        q.put("b", 20);
        assert_eq!(q.len(), 3);
        assert_eq!(q.drain_all(), vec![1, 20, 3]);
    }

    #[test]
    fn replacement_preserves_original_slot() {
        let mut q = NamedQueue::new();
        q.put("first", "a");
        q.put("second", "b");
        q.put("first", "a2");
        // "first" was inserted first, so it still drains first.
        assert_eq!(q.drain_all(), vec!["a2", "b"]);
    }

    #[test]
    fn drain_empties_the_queue() {
        let mut q = NamedQueue::new();
        q.put("x", ());
        assert_eq!(q.drain_all().len(), 1);
        assert_eq!(q.drain_all().len(), 0);
    }
}
