//! Bounded ring buffer of recently received frames.

use std::collections::VecDeque;

use crate::client::Frame;

const DEFAULT_CAPACITY: usize = 100;

/// Append-only event history with front truncation on overflow.
/// Insertion order is preserved; the oldest entries are evicted first.
#[derive(Debug)]
pub struct EventLog {
    items: VecDeque<Frame>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, frame: Frame) {
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(frame);
    }

    /// Entries oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Frame> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: usize) -> Frame {
        Frame::new(format!("evt_{n}"), None)
    }

    #[test]
    fn never_exceeds_capacity_and_keeps_newest() {
        let mut log = EventLog::default();
        for n in 1..=150 {
            log.push(frame(n));
        }
        assert_eq!(log.len(), 100);
        let kinds: Vec<_> = log.iter().map(|f| f.kind.clone()).collect();
        assert_eq!(kinds.first().unwrap(), "evt_51");
        assert_eq!(kinds.last().unwrap(), "evt_150");
        // Order preserved across the whole window.
        for (i, kind) in kinds.iter().enumerate() {
            assert_eq!(kind, &format!("evt_{}", i + 51));
        }
    }

    #[test]
    fn latest_tracks_the_newest_entry() {
        let mut log = EventLog::new(2);
        assert!(log.latest().is_none());
        log.push(frame(1));
        log.push(frame(2));
        assert_eq!(log.latest().unwrap().kind, "evt_2");
    }
}
