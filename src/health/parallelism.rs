//! Available-parallelism providers used to size the worker pool.

use std::num::NonZeroUsize;

/// Source of the "usable processors" figure.
pub trait Parallelism: Send + Sync {
    fn available(&self) -> NonZeroUsize;
}

/// Reads the live value from the OS, falling back to 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemParallelism;

impl Parallelism for SystemParallelism {
    fn available(&self) -> NonZeroUsize {
        std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
    }
}

/// A pinned value, for reproducible sizing.
#[derive(Debug, Clone, Copy)]
pub struct FixedParallelism(NonZeroUsize);

impl FixedParallelism {
    /// Zero is treated as one.
    pub fn new(n: usize) -> Self {
        Self(NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN))
    }
}

impl Parallelism for FixedParallelism {
    fn available(&self) -> NonZeroUsize {
        self.0
    }
}
