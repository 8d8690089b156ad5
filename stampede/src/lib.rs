#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Lets the `#[scenario]`/`#[transaction]` expansions (which name `::stampede`) work in this crate.
extern crate self as stampede;

pub mod scenario;
#[doc(hidden)]
pub mod transaction;

pub(crate) mod measurement;
pub(crate) mod timer;
pub(crate) mod vus;

#[doc(hidden)]
pub use stampede_core as core;

pub use scenario::{ConfigurableScenario, Scenario, ScenarioResult};
pub use stampede_core::{ConfigError, Options, RunStatistics, Stage};
pub use stampede_macros::{scenario, transaction};

pub mod prelude {
    pub use crate::scenario::ConfigurableScenario;
    pub use stampede_core::{ConfigError, Options, RunStatistics, Stage};
    pub use stampede_macros::{scenario, transaction};
}
