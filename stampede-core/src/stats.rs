use std::fmt;
use std::time::Duration;

/// Summary statistics for a completed Scenario run.
#[derive(Clone, Debug, Default)]
pub struct RunStatistics {
    /// Highest number of virtual users running at once.
    pub max_vus: usize,
    /// Completed scenario invocations across all virtual users.
    pub iterations: u64,
    /// Transactions that returned `Ok`.
    pub success: u64,
    /// Transactions that returned `Err`.
    pub error: u64,
    /// Iterations aborted because they outlived the graceful stop window.
    pub interrupted: u64,
    /// Completed transactions per second over the whole run.
    pub rps: f64,
    pub error_rate: f64,
    pub latency_p50: Duration,
    pub latency_p90: Duration,
    pub latency_p95: Duration,
    pub latency_p99: Duration,
    pub elapsed: Duration,
}

impl RunStatistics {
    /// Completed transactions (`success + error`).
    pub fn transactions(&self) -> u64 {
        self.success + self.error
    }

    pub fn success_rate(&self) -> f64 {
        if self.transactions() == 0 {
            0.
        } else {
            self.success as f64 / self.transactions() as f64
        }
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "elapsed={}, max_vus={}, iterations={} (interrupted={}), transactions={} (success={}, error={}), RPS={:.2}, ErrorRate={:.4}, p50={:?}, p90={:?}, p95={:?}, p99={:?}",
            humantime::format_duration(Duration::from_millis(self.elapsed.as_millis() as u64)),
            self.max_vus,
            self.iterations,
            self.interrupted,
            self.transactions(),
            self.success,
            self.error,
            self.rps,
            self.error_rate,
            self.latency_p50,
            self.latency_p90,
            self.latency_p95,
            self.latency_p99,
        )
    }
}
