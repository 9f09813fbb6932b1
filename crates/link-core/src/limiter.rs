//! Bounded-concurrency execution of independent tasks

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;

/// Default maximum number of in-flight filesystem tasks.
pub const DEFAULT_CONCURRENCY: usize = 100;

/// Runs a list of tasks with at most `limit` in flight.
///
/// Workers claim items through a shared atomic index and each result is
/// written back to its item's original position, so the output order always
/// matches the input order regardless of completion order.
#[derive(Debug, Clone, Copy)]
pub struct ConcurrencyLimiter {
    limit: usize,
}

impl ConcurrencyLimiter {
    /// A limit of zero is raised to one.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Apply `task` to every item, returning results in input order.
    pub async fn run<'a, T, R, F, Fut>(&self, items: &'a [T], task: F) -> Vec<R>
    where
        F: Fn(&'a T) -> Fut,
        Fut: Future<Output = R>,
    {
        let next = AtomicUsize::new(0);
        let workers = self.limit.min(items.len());

        let next = &next;
        let task = &task;
        let batches = join_all((0..workers).map(|_| async move {
            let mut done = Vec::new();
            loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(item) = items.get(index) else {
                    break;
                };
                done.push((index, task(item).await));
            }
            done
        }))
        .await;

        let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(items.len()).collect();
        for (index, result) in batches.into_iter().flatten() {
            slots[index] = Some(result);
        }
        slots.into_iter().flatten().collect()
    }
}

impl Default for ConcurrencyLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}
