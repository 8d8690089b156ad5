use crate::{ConfigError, DEFAULT_GRACEFUL_STOP, DEFAULT_TICK};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

/// A single step of the load profile.
///
/// Over `duration` the number of virtual users ramps linearly from the previous stage's target
/// (or the starting VU count for the first stage) to `target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stage {
    pub duration: Duration,
    pub target: u32,
}

impl Stage {
    pub const fn new(duration: Duration, target: u32) -> Self {
        Self { duration, target }
    }

    /// Build a stage from a human readable time span such as `"30s"`, `"1m"` or `"2m 30s"`.
    pub fn parse(duration: &str, target: u32) -> Result<Self, ConfigError> {
        let duration = humantime::parse_duration(duration.trim())?;
        Ok(Self { duration, target })
    }
}

/// Parses the `DURATION:TARGET` form, e.g. `30s:1000`.
impl FromStr for Stage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (duration, target) = s
            .rsplit_once(':')
            .ok_or_else(|| ConfigError::InvalidStage(s.to_string()))?;
        let target = target
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidTarget(target.to_string()))?;
        Self::parse(duration, target)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            humantime::format_duration(self.duration),
            self.target
        )
    }
}

/// Options for a single scenario run.
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    /// Ordered ramp profile.
    pub stages: Vec<Stage>,
    /// Virtual users running at t=0.
    pub start_vus: u32,
    /// Optional cap on transactions per second, shared by every VU.
    pub rps: Option<NonZeroU32>,
    /// Time in-flight iterations get to finish once the schedule has ended.
    pub graceful_stop: Duration,
    /// How often the ramp controller re-evaluates the VU target.
    pub tick: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            stages: vec![],
            start_vus: 0,
            rps: None,
            graceful_stop: DEFAULT_GRACEFUL_STOP,
            tick: DEFAULT_TICK,
        }
    }
}

#[doc(hidden)]
#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    pub name: String,
    pub options: Options,
}

impl ScenarioConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            options: Options::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.options.stages.is_empty() {
            return Err(ConfigError::NoStages);
        }
        if self.options.tick.is_zero() {
            return Err(ConfigError::ZeroTick);
        }
        self.total_duration()?;
        Ok(())
    }

    pub fn total_duration(&self) -> Result<Duration, ConfigError> {
        self.options
            .stages
            .iter()
            .try_fold(Duration::ZERO, |total, stage| total.checked_add(stage.duration))
            .ok_or(ConfigError::DurationOverflow)
    }

    pub fn max_target(&self) -> u32 {
        self.options
            .stages
            .iter()
            .map(|s| s.target)
            .fold(self.options.start_vus, u32::max)
    }

    /// VU target at `elapsed` time into the run, or `None` once the schedule is over.
    pub fn target_at(&self, elapsed: Duration) -> Option<u32> {
        let mut stage_start = Duration::ZERO;
        let mut prev_target = self.options.start_vus;

        for stage in &self.options.stages {
            let stage_end = stage_start.checked_add(stage.duration)?;
            if elapsed < stage_end {
                let progress = (elapsed - stage_start).as_secs_f64() / stage.duration.as_secs_f64();
                let diff = stage.target as f64 - prev_target as f64;
                return Some((prev_target as f64 + diff * progress).floor() as u32);
            }
            stage_start = stage_end;
            prev_target = stage.target;
        }

        None
    }
}
