//! Urgency ranker
//!
//! A fixed-capacity, array-backed binary min-heap. Every parent's key is
//! less than or equal to both children's keys, so the root is always the
//! most urgent item. The ranker is rebuilt from the task snapshot on every
//! run; there is no decrease-key.

use chrono::NaiveDate;

use super::error::StructureError;
use crate::domain::{TaskId, TaskRef};

const NAME: &str = "urgency ranker";

/// Items that can be ordered by urgency
///
/// Smaller keys are more urgent. The key should be a total order over
/// distinct items so that extraction order depends only on the heap's
/// contents, not on how it was built.
pub trait Ranked {
    type Key: Ord;

    fn rank_key(&self) -> Self::Key;
}

impl Ranked for TaskRef {
    /// Urgency first, then earlier deadline, then lower id
    type Key = (u8, NaiveDate, TaskId);

    fn rank_key(&self) -> Self::Key {
        (self.urgency, self.deadline, self.id)
    }
}

/// Bounded min-heap over [`Ranked`] items
#[derive(Debug, Clone)]
pub struct UrgencyRanker<T> {
    heap: Vec<T>,
    capacity: usize,
}

impl<T: Ranked> UrgencyRanker<T> {
    /// Creates an empty ranker that holds at most `capacity` items
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Inserts an item, failing if the ranker is full
    pub fn insert(&mut self, item: T) -> Result<(), StructureError> {
        if self.is_full() {
            return Err(StructureError::CapacityExceeded {
                structure: NAME,
                capacity: self.capacity,
            });
        }

        self.push(item);
        Ok(())
    }

    /// Removes and returns the most urgent item
    pub fn extract_min(&mut self) -> Result<T, StructureError> {
        let last = self.heap.pop().ok_or(StructureError::Empty(NAME))?;
        if self.heap.is_empty() {
            return Ok(last);
        }

        let root = std::mem::replace(&mut self.heap[0], last);
        self.sift_down(0);
        Ok(root)
    }

    /// Returns the most urgent item without removing it
    pub fn peek(&self) -> Result<&T, StructureError> {
        self.heap.first().ok_or(StructureError::Empty(NAME))
    }

    /// Returns up to `k` most urgent items in order, leaving the ranker as
    /// it was
    ///
    /// Items are extracted and then every one is reinserted, so later
    /// extractions see the same order as before the call.
    pub fn top_k(&mut self, k: usize) -> Vec<T>
    where
        T: Clone,
    {
        let mut taken = Vec::with_capacity(k.min(self.len()));
        while taken.len() < k {
            match self.extract_min() {
                Ok(item) => taken.push(item),
                Err(_) => break,
            }
        }

        let top = taken.clone();
        // Reinsertion cannot overflow: these slots were just freed.
        for item in taken {
            self.push(item);
        }

        top
    }

    /// Drains the ranker, most urgent first
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.len());
        while let Ok(item) = self.extract_min() {
            sorted.push(item);
        }
        sorted
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn push(&mut self, item: T) {
        self.heap.push(item);
        self.sift_up(self.heap.len() - 1);
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap[index].rank_key() >= self.heap[parent].rank_key() {
                break;
            }
            self.heap.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;

            if left < len && self.heap[left].rank_key() < self.heap[smallest].rank_key() {
                smallest = left;
            }
            if right < len && self.heap[right].rank_key() < self.heap[smallest].rank_key() {
                smallest = right;
            }
            if smallest == index {
                break;
            }

            self.heap.swap(index, smallest);
            index = smallest;
        }
    }

    #[cfg(test)]
    fn is_heap(&self) -> bool {
        (1..self.heap.len()).all(|i| self.heap[(i - 1) / 2].rank_key() <= self.heap[i].rank_key())
    }
}
