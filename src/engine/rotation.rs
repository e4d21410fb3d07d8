//! Allocation queue
//!
//! A fixed-capacity ring buffer used to rotate assignees. `len` counts the
//! live entries; `head` is the next slot to dequeue and `tail` the next
//! slot to fill, both wrapping at `capacity`.

use super::error::StructureError;

const NAME: &str = "allocation queue";

#[derive(Debug, Clone)]
pub struct AllocationQueue<T> {
    slots: Vec<Option<T>>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> AllocationQueue<T> {
    /// Creates an empty queue that holds at most `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Adds an entry at the tail
    pub fn enqueue(&mut self, item: T) -> Result<(), StructureError> {
        if self.is_full() {
            return Err(StructureError::CapacityExceeded {
                structure: NAME,
                capacity: self.capacity(),
            });
        }

        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.capacity();
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the entry at the head
    pub fn dequeue(&mut self) -> Result<T, StructureError> {
        if self.is_empty() {
            return Err(StructureError::Empty(NAME));
        }

        let item = self.slots[self.head]
            .take()
            .ok_or(StructureError::Empty(NAME))?;
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        Ok(item)
    }

    /// Returns the entry at the head without removing it
    pub fn peek(&self) -> Result<&T, StructureError> {
        if self.is_empty() {
            return Err(StructureError::Empty(NAME));
        }

        self.slots[self.head]
            .as_ref()
            .ok_or(StructureError::Empty(NAME))
    }

    /// Takes the head entry and puts it back at the tail, returning a
    /// reference to it in its new position
    pub fn rotate(&mut self) -> Result<&T, StructureError> {
        let item = self.dequeue()?;
        // A slot was just freed, so this cannot overflow.
        self.enqueue(item)?;

        let last = (self.tail + self.capacity() - 1) % self.capacity();
        self.slots[last].as_ref().ok_or(StructureError::Empty(NAME))
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let mut queue = AllocationQueue::with_capacity(3);
        queue.enqueue('a').unwrap();
        queue.enqueue('b').unwrap();
        queue.enqueue('c').unwrap();

        assert_eq!(queue.dequeue(), Ok('a'));
        assert_eq!(queue.dequeue(), Ok('b'));
        assert_eq!(queue.dequeue(), Ok('c'));
        assert!(queue.is_empty());
    }

    #[test]
    fn wraps_around() {
        let mut queue = AllocationQueue::with_capacity(2);
        for round in 0..5 {
            queue.enqueue(round).unwrap();
            queue.enqueue(round + 100).unwrap();
            assert!(queue.is_full());
            assert_eq!(queue.dequeue(), Ok(round));
            assert_eq!(queue.dequeue(), Ok(round + 100));
        }
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn enqueue_fails_when_full() {
        let mut queue = AllocationQueue::with_capacity(1);
        queue.enqueue(1).unwrap();

        assert_eq!(
            queue.enqueue(2),
            Err(StructureError::CapacityExceeded {
                structure: "allocation queue",
                capacity: 1
            })
        );
        assert_eq!(queue.peek(), Ok(&1));
    }

    #[test]
    fn zero_capacity_queue() {
        let mut queue = AllocationQueue::with_capacity(0);
        assert!(queue.is_empty());
        assert!(queue.is_full());
        assert!(queue.enqueue(1).is_err());
        assert!(queue.dequeue().is_err());
    }

    #[test]
    fn dequeue_and_peek_on_empty() {
        let mut queue: AllocationQueue<u8> = AllocationQueue::with_capacity(4);
        assert_eq!(queue.dequeue(), Err(StructureError::Empty("allocation queue")));
        assert_eq!(queue.peek(), Err(StructureError::Empty("allocation queue")));
    }

    #[test]
    fn rotate_cycles_through_entries() {
        let mut queue = AllocationQueue::with_capacity(3);
        for name in ["ada", "bob", "cy"] {
            queue.enqueue(name).unwrap();
        }

        let picked: Vec<_> = (0..7).map(|_| *queue.rotate().unwrap()).collect();
        assert_eq!(picked, vec!["ada", "bob", "cy", "ada", "bob", "cy", "ada"]);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.peek(), Ok(&"bob"));
    }

    #[test]
    fn clear_resets() {
        let mut queue = AllocationQueue::with_capacity(2);
        queue.enqueue(1).unwrap();
        queue.enqueue(2).unwrap();
        queue.clear();

        assert!(queue.is_empty());
        queue.enqueue(3).unwrap();
        assert_eq!(queue.dequeue(), Ok(3));
    }
}
