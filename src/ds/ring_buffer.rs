use std::ops::Index;

/// A bounded FIFO buffer that overwrites its oldest element once full
///
/// Elements are stored in a flat `Vec`; `next` is the slot the next push
/// writes to, which is also the oldest element once the buffer is full.
#[derive(Debug, Default, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<T>,
    next: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be nonzero");
        Self {
            slots: Vec::with_capacity(capacity),
            next: 0,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an element, returning the one it evicted if the buffer was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let slot = self.next;
        self.next = (slot + 1) % self.capacity;
        if self.is_full() {
            Some(std::mem::replace(&mut self.slots[slot], item))
        } else {
            self.slots.push(item);
            None
        }
    }

    /// Elements in storage order, which is not chronological once wrapped
    pub fn view(&self) -> &[T] {
        &self.slots
    }

    /// Iterate from the oldest element to the newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let split = if self.is_full() { self.next } else { 0 };
        let (newer, older) = self.slots.split_at(split);
        older.iter().chain(newer)
    }
}

impl<T> Index<usize> for RingBuffer<T> {
    type Output = T;

    /// Element at storage index `index`
    fn index(&self, index: usize) -> &Self::Output {
        &self.slots[index]
    }
}
