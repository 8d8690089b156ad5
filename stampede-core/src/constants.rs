use std::time::Duration;

/// Default time in-flight iterations get to finish after the schedule ends.
pub const DEFAULT_GRACEFUL_STOP: Duration = Duration::from_secs(30);

/// Default ramp controller interval.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// How often a progress line is logged during a run.
pub const REPORT_INTERVAL: Duration = Duration::from_secs(10);

/// Gauge tracking the number of running virtual users.
pub const VUS_GAUGE: &str = "stampede_vus";
