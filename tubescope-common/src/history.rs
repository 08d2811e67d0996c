//! Bounded most-recently-used search history
//!
//! Each live session remembers its last few distinct queries so they can be
//! replayed on every refresh tick. Entries are kept oldest-first; the back of
//! the list is the most recent query.

use std::collections::VecDeque;

/// Default number of remembered queries per session
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Ordered, de-duplicated MRU list of query strings
///
/// Invariants:
/// - `len() <= capacity()`
/// - no query appears twice
/// - re-recording a present query moves it to the most-recent position
#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl SearchHistory {
    /// Create an empty history holding at most `capacity` queries
    ///
    /// A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a query as most recent
    ///
    /// Returns the least-recently-used query if one had to be evicted.
    pub fn record(&mut self, query: &str) -> Option<String> {
        if let Some(pos) = self.entries.iter().position(|q| q == query) {
            if let Some(existing) = self.entries.remove(pos) {
                self.entries.push_back(existing);
            }
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(query.to_string());
        evicted
    }

    /// Queries from least to most recent
    pub fn queries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Owned copy of the queries, least recent first
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Most recently recorded query
    pub fn most_recent(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    pub fn contains(&self, query: &str) -> bool {
        self.entries.iter().any(|q| q == query)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
