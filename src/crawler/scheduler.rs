//! Concurrency limiting and politeness delay
//!
//! Every page fetch of a crawl goes through one `Scheduler`:
//! - A semaphore bounds the number of fetches in flight
//! - Each fetch sleeps for the crawl delay after acquiring its permit
//!
//! Permits are granted in FIFO order, so within a batch fetches start in the
//! order they were dispatched.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Bounds in-flight fetches and spaces them out
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,

    /// Sleep before each fetch
    crawl_delay: Duration,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `parallel` - Maximum fetches in flight (at least 1)
    /// * `crawl_delay` - Delay applied before each fetch
    pub fn new(parallel: usize, crawl_delay: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(parallel.max(1))),
            crawl_delay,
        }
    }

    /// Runs `task` once a slot is free and the crawl delay has elapsed
    ///
    /// The slot is held until `task` completes.
    ///
    /// # Returns
    ///
    /// * `Some(T)` - Output of `task`
    /// * `None` - The semaphore was closed; `task` was not run
    pub async fn run<F, T>(&self, task: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let _permit = self.semaphore.acquire().await.ok()?;

        if !self.crawl_delay.is_zero() {
            tokio::time::sleep(self.crawl_delay).await;
        }

        Some(task.await)
    }

    /// Number of free slots
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn crawl_delay(&self) -> Duration {
        self.crawl_delay
    }
}
