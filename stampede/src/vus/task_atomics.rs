use crate::transaction::TransactionData;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use metrics_util::AtomicBucket;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counters shared between the controller and every VU task.
pub(crate) struct TaskAtomics {
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
    iterations: Arc<AtomicU64>,
    success: Arc<AtomicU64>,
    error: Arc<AtomicU64>,
    latency: Arc<AtomicBucket<Duration>>,
}

impl TaskAtomics {
    pub fn new(rps: Option<NonZeroU32>) -> Self {
        Self {
            limiter: rps.map(|rps| Arc::new(rate_limiter(rps))),
            iterations: Arc::new(AtomicU64::new(0)),
            success: Arc::new(AtomicU64::new(0)),
            error: Arc::new(AtomicU64::new(0)),
            latency: Arc::new(AtomicBucket::new()),
        }
    }

    pub fn clone_to_transaction_data(&self) -> TransactionData {
        TransactionData {
            limiter: self.limiter.clone(),
            success: self.success.clone(),
            error: self.error.clone(),
            latency: self.latency.clone(),
        }
    }

    /// Counter bumped by a VU each time a scenario invocation returns.
    pub fn iteration_counter(&self) -> Arc<AtomicU64> {
        self.iterations.clone()
    }

    /// Drain everything recorded since the last call.
    pub fn collect(&self) -> Sample {
        let iterations = self.iterations.swap(0, Ordering::Relaxed);
        let success = self.success.swap(0, Ordering::Relaxed);
        let error = self.error.swap(0, Ordering::Relaxed);
        let mut latency = vec![];
        self.latency.clear_with(|dur| {
            latency.extend_from_slice(dur);
        });

        Sample {
            iterations,
            success,
            error,
            latency,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Sample {
    pub iterations: u64,
    pub success: u64,
    pub error: u64,
    pub latency: Vec<Duration>,
}

fn rate_limiter(rps: NonZeroU32) -> DefaultDirectRateLimiter {
    RateLimiter::direct(Quota::per_second(rps).allow_burst(NonZeroU32::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_resets() {
        let atomics = TaskAtomics::new(None);
        let data = atomics.clone_to_transaction_data();
        assert!(data.limiter.is_none());

        atomics.iteration_counter().fetch_add(2, Ordering::Relaxed);
        data.success.fetch_add(3, Ordering::Relaxed);
        data.error.fetch_add(1, Ordering::Relaxed);
        data.latency.push(Duration::from_millis(5));

        let sample = atomics.collect();
        assert_eq!(sample.iterations, 2);
        assert_eq!(sample.success, 3);
        assert_eq!(sample.error, 1);
        assert_eq!(sample.latency, vec![Duration::from_millis(5)]);

        let sample = atomics.collect();
        assert_eq!(sample.iterations, 0);
        assert_eq!(sample.success, 0);
        assert_eq!(sample.error, 0);
        assert!(sample.latency.is_empty());
    }

    #[test]
    fn limiter_is_shared() {
        let atomics = TaskAtomics::new(NonZeroU32::new(10));
        let a = atomics.clone_to_transaction_data();
        let b = atomics.clone_to_transaction_data();

        let (Some(a), Some(b)) = (a.limiter, b.limiter) else {
            panic!("limiter missing");
        };
        assert!(Arc::ptr_eq(&a, &b));
    }
}
