use std::collections::{BTreeMap, VecDeque};

/// A bucketed priority queue which pops the lowest priority first.
/// Items with equal priority come out in insertion order.
///
/// Buckets are kept sparse, so priorities may be arbitrarily large.
pub struct PriorityQueue<T> {
    buckets: BTreeMap<u64, VecDeque<T>>,
    len: usize,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            len: 0,
        }
    }

    pub fn push(&mut self, priority: u64, item: T) {
        self.buckets.entry(priority).or_default().push_back(item);
        self.len += 1;
    }

    pub fn pop_min(&mut self) -> Option<T> {
        let mut entry = self.buckets.first_entry()?;
        let item = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        if item.is_some() {
            self.len -= 1;
        }
        item
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
