use core::cell::Cell;

/// Monotonic event counter.
#[derive(Debug, Default)]
pub struct Counter(Cell<u64>);

impl Counter {
    /// A counter starting at zero.
    pub const fn new() -> Self {
        Self(Cell::new(0))
    }

    /// Add one.
    pub fn increment(&self) {
        self.add(1);
    }

    /// Add `n`.
    pub fn add(&self, n: u64) {
        self.0.set(self.0.get().saturating_add(n));
    }

    /// Current value.
    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_up() {
        let c = Counter::new();
        c.increment();
        c.add(4);
        assert_eq!(c.get(), 5);
    }

    #[test]
    fn saturates() {
        let c = Counter::new();
        c.add(u64::MAX);
        c.increment();
        assert_eq!(c.get(), u64::MAX);
    }
}
