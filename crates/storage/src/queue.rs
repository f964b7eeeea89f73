use rand::rng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;

/// FIFO of pool indices staged in random order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexQueue {
    entries: VecDeque<usize>,
}

impl IndexQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue holding a uniform shuffle of `0..pool_size`.
    #[must_use]
    pub fn shuffled(pool_size: usize) -> Self {
        let mut queue = Self::new();
        queue.reset((0..pool_size).collect());
        queue
    }

    /// A queue that yields `order` exactly as given.
    #[must_use]
    pub fn from_order(order: impl IntoIterator<Item = usize>) -> Self {
        Self {
            entries: order.into_iter().collect(),
        }
    }

    /// Replace the contents with a shuffled copy of `indices`.
    pub fn reset(&mut self, mut indices: Vec<usize>) {
        indices.as_mut_slice().shuffle(&mut rng());
        self.entries = indices.into();
    }

    pub fn pop_front(&mut self) -> Option<usize> {
        self.entries.pop_front()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &usize> {
        self.entries.iter()
    }
}
