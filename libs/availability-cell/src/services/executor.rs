use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task;
use tracing::debug;

use crate::error::AvailabilityError;

/// Bounded pool for CPU-heavy availability computations.
///
/// The interval subtraction costs `open * busy` in the worst case, so it
/// must not run on the request path. Jobs take a semaphore permit and run
/// on the blocking thread pool; at most `max_concurrent` run at once and a
/// slow computation for one doctor never stalls other in-flight requests.
///
/// The pool keeps no state between jobs. Dropping the future returned by
/// [`ComputeExecutor::run`] releases the caller's claim: a queued job gives
/// its permit back immediately, a started job finishes on the blocking
/// thread and its result is discarded.
pub struct ComputeExecutor {
    permits: Arc<Semaphore>,
}

impl ComputeExecutor {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub async fn run<T, F>(&self, job: F) -> Result<T, AvailabilityError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| AvailabilityError::Canceled)?;

        task::spawn_blocking(job).await.map_err(|err| {
            if err.is_cancelled() {
                AvailabilityError::Canceled
            } else {
                AvailabilityError::Internal(format!("computation panicked: {}", err))
            }
        })
    }

    /// Stops accepting new jobs; in-flight jobs run to completion and later
    /// calls to [`ComputeExecutor::run`] fail with `Canceled`.
    pub fn shutdown(&self) {
        debug!("Compute executor shutting down");
        self.permits.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tokio_test::assert_ok;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn runs_a_job_and_returns_its_result() {
        let executor = ComputeExecutor::new(2);

        let result = executor.run(|| 2 + 2).await;

        assert_eq!(assert_ok!(result), 4);
    }

    #[tokio::test]
    async fn never_exceeds_the_configured_concurrency() {
        let executor = Arc::new(ComputeExecutor::new(2));
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let executor = Arc::clone(&executor);
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            handles.push(tokio::spawn(async move {
                executor
                    .run(move || {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(20));
                        running.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn shutdown_cancels_later_jobs() {
        let executor = ComputeExecutor::new(1);
        executor.shutdown();

        let result = executor.run(|| ()).await;

        assert_matches!(result, Err(AvailabilityError::Canceled));
    }

    #[tokio::test]
    async fn a_panicking_job_surfaces_as_internal_error() {
        let executor = ComputeExecutor::new(1);

        let result = executor.run(|| panic!("boom")).await;

        assert_matches!(result, Err(AvailabilityError::Internal(_)));
    }
}
