use serde::{Deserialize, Serialize};

/// Options for a batched all-pairs computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// The caller asserts both batches are the same collection in the same order.
    /// Only the strict upper triangle is computed; the diagonal is zero.
    pub symmetric: bool,
    /// Worker count. `0` uses rayon's global pool, `1` runs on the calling thread.
    pub num_threads: usize,
}

impl BatchOptions {
    pub fn symmetric(symmetric: bool) -> Self {
        Self { symmetric, ..Self::default() }
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }
}
