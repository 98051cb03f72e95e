use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// `f32` stored through its bit pattern.
#[derive(Debug, Default)]
pub struct AtomicF32 {
    bits: AtomicU32,
}

impl AtomicF32 {
    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::SeqCst))
    }

    pub fn store(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::SeqCst);
    }

    /// Adds `delta` and returns the previous value; retries on contention, so
    /// no update gets lost.
    pub fn fetch_add(&self, delta: f32) -> f32 {
        let prev = self
            .bits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |bits| {
                Some((f32::from_bits(bits) + delta).to_bits())
            })
            .unwrap_or_else(|bits| bits);

        f32::from_bits(prev)
    }
}

/// `f64` stored through its bit pattern.
#[derive(Debug, Default)]
pub struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }

    pub fn store(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::SeqCst);
    }
}
