use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

/// Value shared between a single writer and any number of readers.
///
/// Writes land in the slot readers aren't looking at; the slot index gets
/// published afterwards, so a reader observes either the previous complete
/// value or the new complete value.
///
/// Readers hold the slot's lock only while cloning it; a publish waits only
/// when a reader got stalled inside that clone of the slot it's about to
/// overwrite.
#[derive(Debug, Default)]
pub struct DoubleBuffered<T> {
    slots: [RwLock<T>; 2],
    active: AtomicUsize,
}

impl<T> DoubleBuffered<T>
where
    T: Clone,
{
    pub fn publish(&self, value: T) {
        let next = (self.active.load(Ordering::SeqCst) + 1) & 1;

        *self.slots[next].write() = value;
        self.active.store(next, Ordering::SeqCst);
    }

    pub fn read(&self) -> T {
        let curr = self.active.load(Ordering::SeqCst);

        self.slots[curr].read().clone()
    }
}

impl<T> DoubleBuffered<T>
where
    T: Clone + Default,
{
    pub fn reset(&self) {
        self.publish(T::default());
    }
}
