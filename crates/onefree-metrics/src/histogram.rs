use core::cell::{Cell, RefCell};

/// Number of power-of-two buckets; the last one also takes everything larger.
const BUCKETS: usize = 16;

/// Distribution of request sizes in power-of-two buckets.
///
/// Bucket `0` counts zero-size values, bucket `i` counts values in
/// `[2^(i-1), 2^i)`.
#[derive(Debug, Default)]
pub struct Histogram {
    buckets: RefCell<[u64; BUCKETS]>,
    count: Cell<u64>,
    max: Cell<u64>,
}

fn bucket_of(value: u64) -> usize {
    let bits = (u64::BITS - value.leading_zeros()) as usize;
    bits.min(BUCKETS - 1)
}

impl Histogram {
    /// Record one observation.
    pub fn record(&self, value: u64) {
        self.buckets.borrow_mut()[bucket_of(value)] += 1;
        self.count.set(self.count.get() + 1);
        self.max.set(self.max.get().max(value));
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.count.get()
    }

    /// Largest observation, zero if none.
    pub fn max(&self) -> u64 {
        self.max.get()
    }

    /// Copy of the bucket counts.
    pub fn buckets(&self) -> [u64; BUCKETS] {
        *self.buckets.borrow()
    }
}
