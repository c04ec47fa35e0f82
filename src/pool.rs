use rayon::ThreadPool;
use tracing::info;

use crate::error::{EditDistanceError, Result};

/// Where the rows of a batch get computed.
pub(crate) enum Executor {
    /// On the calling thread, one row after another.
    Serial,
    /// On rayon's global pool.
    Global,
    /// On a pool built for this call.
    Dedicated(ThreadPool),
}

impl Executor {
    pub(crate) fn for_threads(num_threads: usize) -> Result<Self> {
        match num_threads {
            0 if cfg!(target_arch = "wasm32") => Ok(Executor::Serial),
            0 => Ok(Executor::Global),
            1 => Ok(Executor::Serial),
            n => create_thread_pool(n).map(Executor::Dedicated),
        }
    }

    pub(crate) fn is_serial(&self) -> bool {
        matches!(self, Executor::Serial)
    }

    /// Runs `op` inside the pool when there is one.
    pub(crate) fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match self {
            Executor::Dedicated(pool) => pool.install(op),
            Executor::Serial | Executor::Global => op(),
        }
    }
}

/// Builds a pool with `num_threads` workers, capped at the number of logical CPUs.
pub fn create_thread_pool(num_threads: usize) -> Result<ThreadPool> {
    let threads = num_threads.min(num_cpus::get().max(1));
    info!("Using Rayon thread pool with {} threads (requested {}).", threads, num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| EditDistanceError::ThreadPool(e.to_string()))
}
