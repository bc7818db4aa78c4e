//! Fixed-size worker pool with a blocking fan-out over agent ranges.
//!
//! The agent index range `0..n` is cut into one contiguous block per worker
//! (`block * n / w .. (block + 1) * n / w`).  [`WorkerPool::for_each`] runs a
//! closure over every element of a slice, one block per task, and returns
//! only once every block is done.  That return is the barrier between the
//! two step phases.

use std::ops::Range;

use log::debug;

/// Worker pool plus the current partition of the agent range.
pub struct WorkerPool {
    workers:     usize,
    agent_count: usize,
    ranges:      Vec<Range<usize>>,
    #[cfg(feature = "parallel")]
    pool:        Option<rayon::ThreadPool>,
}

impl WorkerPool {
    /// Create a pool of `workers` threads (at least one) partitioned over
    /// `agent_count` agents.
    ///
    /// If the thread pool cannot be started, every phase runs on the
    /// caller's thread instead.
    pub fn new(workers: usize, agent_count: usize) -> Self {
        let workers = workers.max(1);

        #[cfg(feature = "parallel")]
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("rvo-worker-{i}"))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!("worker pool unavailable, stepping on the caller thread: {e}");
                None
            }
        };

        debug!("worker pool created with {workers} workers");

        let mut this = Self {
            workers,
            agent_count: 0,
            ranges: Vec::with_capacity(workers),
            #[cfg(feature = "parallel")]
            pool,
        };
        this.partition(agent_count);
        this
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Agent count the current partition was computed for.
    #[inline]
    pub fn agent_count(&self) -> usize {
        self.agent_count
    }

    /// One contiguous index range per worker, in order.  Some may be empty.
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Re-split `0..agent_count` evenly across the workers.
    pub fn partition(&mut self, agent_count: usize) {
        let w = self.workers;
        self.agent_count = agent_count;
        self.ranges.clear();
        self.ranges
            .extend((0..w).map(|block| block * agent_count / w..(block + 1) * agent_count / w));
        debug!("worker pool partitioned {agent_count} agents over {w} workers");
    }

    /// Call `f(index, &mut items[index])` for every element, one task per
    /// block, and block until all tasks finish.
    ///
    /// `items.len()` must equal the partitioned agent count.
    pub fn for_each<T, F>(&self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync,
    {
        debug_assert_eq!(items.len(), self.agent_count);

        #[cfg(feature = "parallel")]
        {
            if let Some(pool) = &self.pool {
                let f = &f;
                pool.scope(|scope| {
                    let mut rest = items;
                    for range in &self.ranges {
                        let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
                        rest = tail;
                        let start = range.start;
                        scope.spawn(move |_| {
                            for (offset, item) in chunk.iter_mut().enumerate() {
                                f(start + offset, item);
                            }
                        });
                    }
                });
                return;
            }
        }

        for range in &self.ranges {
            for i in range.clone() {
                f(i, &mut items[i]);
            }
        }
    }
}
