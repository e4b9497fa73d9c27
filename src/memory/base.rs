use rand::{seq::index, Rng};

use crate::{ds::RingBuffer, env::Environment};

use super::{Exp, ExpBatch};

/// A fixed-size memory storage for reinforcement learning experiences
///
/// This structure uses a ring buffer to store experiences, which are tuples of
/// (state, action, reward, next state, done). It automatically overwrites the
/// oldest experiences once it reaches its capacity.
///
/// ### Type Parameters:
/// - `E`: Environment
pub struct ReplayMemory<E: Environment> {
    memory: RingBuffer<Exp<E>>,
}

impl<E: Environment> ReplayMemory<E> {
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        Self {
            memory: RingBuffer::new(capacity),
        }
    }

    /// Add a new experience to the memory, evicting the oldest one when full
    pub fn push(&mut self, exp: Exp<E>) {
        self.memory.push(exp);
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.memory.capacity()
    }

    /// Iterate over stored experiences from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Exp<E>> {
        self.memory.iter()
    }

    /// Sample a batch of distinct experiences uniformly at random
    ///
    /// Returns every stored experience when there are no more than `batch_size` of them.
    pub fn sample(&self, batch_size: usize, rng: &mut impl Rng) -> Vec<&Exp<E>> {
        let len = self.memory.len();
        if len <= batch_size {
            return self.memory.view().iter().collect();
        }

        index::sample(rng, len, batch_size)
            .into_iter()
            .map(|i| &self.memory[i])
            .collect()
    }

    /// Sample a batch and zip the vector of tuples into a tuple of vectors
    pub fn sample_zipped(&self, batch_size: usize, rng: &mut impl Rng) -> ExpBatch<E> {
        let experiences = self.sample(batch_size, rng);
        let len = experiences.len();
        ExpBatch::from_iter(experiences, len)
    }
}
