use crate::vus::Sample;
use pdatastructs::tdigest::{TDigest, K1};
use stampede_core::RunStatistics;
use std::fmt;
use std::time::Duration;

const TDIGEST_BACKLOG_SIZE: usize = 100;

/// Running aggregate of transaction results over some window of time.
#[derive(Debug, Clone)]
pub(crate) struct Measurement {
    pub iterations: u64,
    pub success: u64,
    pub error: u64,
    pub elapsed: Duration,
    latency: TDigest<K1>,
}

impl Measurement {
    pub fn new() -> Self {
        Self {
            iterations: 0,
            success: 0,
            error: 0,
            elapsed: Duration::ZERO,
            latency: default_tdigest(),
        }
    }

    pub fn absorb(&mut self, sample: &Sample, elapsed: Duration) {
        self.iterations += sample.iterations;
        self.success += sample.success;
        self.error += sample.error;
        self.elapsed += elapsed;
        // NOTE: Whole microseconds keep centroid sums exact, so a centroid mean never drifts
        // outside the range of the values it holds.
        for latency in &sample.latency {
            self.latency.insert(latency.as_micros() as f64);
        }
    }

    pub fn total(&self) -> u64 {
        self.success + self.error
    }

    pub fn rps(&self) -> f64 {
        if self.elapsed.is_zero() {
            0.
        } else {
            self.total() as f64 / self.elapsed.as_secs_f64()
        }
    }

    pub fn error_rate(&self) -> f64 {
        if self.total() == 0 {
            0.
        } else {
            self.error as f64 / self.total() as f64
        }
    }

    pub fn latency(&self, quantile: f64) -> Duration {
        let micros = self.latency.quantile(quantile);

        // NOTE: An empty TDigest yields NaN.
        let micros = if micros.is_finite() && micros >= 0. {
            micros
        } else {
            0.
        };

        Duration::from_micros(micros.round() as u64)
    }

    pub fn into_statistics(self, max_vus: usize, interrupted: u64) -> RunStatistics {
        RunStatistics {
            max_vus,
            iterations: self.iterations,
            success: self.success,
            error: self.error,
            interrupted,
            rps: self.rps(),
            error_rate: self.error_rate(),
            latency_p50: self.latency(0.50),
            latency_p90: self.latency(0.90),
            latency_p95: self.latency(0.95),
            latency_p99: self.latency(0.99),
            elapsed: self.elapsed,
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "iterations={}, RPS={:.2}, ErrorRate={:.2}, p50={:?}, p90={:?}, p99={:?}",
            self.iterations,
            self.rps(),
            self.error_rate(),
            self.latency(0.5),
            self.latency(0.90),
            self.latency(0.99),
        )
    }
}

fn default_tdigest() -> TDigest<K1> {
    TDigest::new(K1::new(10.), TDIGEST_BACKLOG_SIZE)
}
