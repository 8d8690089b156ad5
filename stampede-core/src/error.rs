use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No stages configured for the scenario.")]
    NoStages,

    #[error("Ramp tick interval must be non-zero.")]
    ZeroTick,

    #[error("Total stage duration overflows.")]
    DurationOverflow,

    #[error("Invalid stage duration: {0}")]
    InvalidDuration(#[from] humantime::DurationError),

    #[error("Invalid stage `{0}`, expected DURATION:TARGET (e.g. 30s:1000)")]
    InvalidStage(String),

    #[error("Invalid stage target `{0}`, expected a non-negative integer")]
    InvalidTarget(String),
}
