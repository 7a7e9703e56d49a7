use onefree_api::RawAllocator;

use crate::{Counter, Histogram};

/// Point-in-time view of a [`Metered`] allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeterSnapshot {
    /// Successful `raw_alloc` calls.
    pub allocations: u64,
    /// `raw_alloc` calls that returned nothing.
    pub failures: u64,
    /// `raw_free` calls.
    pub frees: u64,
}

impl MeterSnapshot {
    /// Allocations not yet freed.
    pub fn live(&self) -> u64 {
        self.allocations.saturating_sub(self.frees)
    }
}

/// Allocator wrapper that counts every primitive call it forwards.
#[derive(Debug, Default)]
pub struct Metered<A> {
    inner: A,
    allocations: Counter,
    failures: Counter,
    frees: Counter,
    sizes: Histogram,
}

impl<A> Metered<A> {
    /// Wrap `inner`.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            allocations: Counter::new(),
            failures: Counter::new(),
            frees: Counter::new(),
            sizes: Histogram::default(),
        }
    }

    /// The wrapped allocator.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Sizes of successful allocations.
    pub fn sizes(&self) -> &Histogram {
        &self.sizes
    }

    /// Current counter values.
    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            allocations: self.allocations.get(),
            failures: self.failures.get(),
            frees: self.frees.get(),
        }
    }
}

impl<A: RawAllocator> RawAllocator for Metered<A> {
    type Block = A::Block;

    fn raw_alloc(&self, size: usize) -> Option<A::Block> {
        let block = self.inner.raw_alloc(size);
        match block {
            Some(_) => {
                self.allocations.increment();
                self.sizes.record(size as u64);
            }
            None => self.failures.increment(),
        }
        block
    }

    fn raw_free(&self, block: A::Block) {
        self.frees.increment();
        self.inner.raw_free(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct Budget(Cell<u32>);

    impl RawAllocator for Budget {
        type Block = ();

        fn raw_alloc(&self, _size: usize) -> Option<()> {
            let left = self.0.get();
            if left == 0 {
                return None;
            }
            self.0.set(left - 1);
            Some(())
        }

        fn raw_free(&self, _block: ()) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn counts_forwarded_calls() {
        let meter = Metered::new(Budget(Cell::new(1)));
        let block = meter.raw_alloc(8).expect("allocation");
        assert!(meter.raw_alloc(8).is_none());
        assert_eq!(
            meter.snapshot(),
            MeterSnapshot {
                allocations: 1,
                failures: 1,
                frees: 0
            }
        );
        assert_eq!(meter.snapshot().live(), 1);

        meter.raw_free(block);
        assert_eq!(meter.snapshot().frees, 1);
        assert_eq!(meter.snapshot().live(), 0);
        assert_eq!(meter.inner().0.get(), 1);
        assert_eq!(meter.sizes().count(), 1);
    }
}
