//! Bounded log of recent button edges, newest first

use super::edges::InputEdgeEvent;
use std::collections::VecDeque;

/// Default number of edges kept in the recent-history log.
pub const DEFAULT_HISTORY_CAPACITY: usize = 14;

/// Fixed-capacity edge log. The front is always the most recent event.
#[derive(Debug, Clone)]
pub struct EdgeHistory {
    events: VecDeque<InputEdgeEvent>,
    capacity: usize,
}

impl EdgeHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record one edge, evicting the oldest entry once full.
    pub fn push(&mut self, event: InputEdgeEvent) {
        if self.capacity == 0 {
            return;
        }
        self.events.push_front(event);
        self.events.truncate(self.capacity);
    }

    /// Record a frame's edges in detection order; the last one ends up in front.
    pub fn extend<I: IntoIterator<Item = InputEdgeEvent>>(&mut self, events: I) {
        for event in events {
            self.push(event);
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Change capacity, dropping the oldest entries if it shrank.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.events.truncate(capacity);
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEdgeEvent> {
        self.events.iter()
    }

    pub fn to_vec(&self) -> Vec<InputEdgeEvent> {
        self.events.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EdgeHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::gamepad::edges::EdgeKind;

    fn edge(button_index: usize, occurred_at: f64) -> InputEdgeEvent {
        InputEdgeEvent {
            kind: EdgeKind::Pressed,
            button_index,
            controller_index: 0,
            occurred_at,
        }
    }

    #[test]
    fn test_keeps_most_recent_newest_first() {
        let mut history = EdgeHistory::default();
        for i in 0..20 {
            history.push(edge(i, i as f64));
        }

        assert_eq!(history.len(), 14);
        let buttons: Vec<usize> = history.iter().map(|e| e.button_index).collect();
        assert_eq!(buttons, (6..20).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_shrinking_capacity_drops_oldest() {
        let mut history = EdgeHistory::new(5);
        history.extend((0..5).map(|i| edge(i, 0.0)));
        history.set_capacity(2);

        let buttons: Vec<usize> = history.iter().map(|e| e.button_index).collect();
        assert_eq!(buttons, vec![4, 3]);
    }

    #[test]
    fn test_zero_capacity_records_nothing() {
        let mut history = EdgeHistory::new(0);
        history.push(edge(1, 0.0));
        assert!(history.is_empty());
    }
}
