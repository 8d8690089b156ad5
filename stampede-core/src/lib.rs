mod config;
mod constants;
mod error;
mod metrics;
mod stats;

pub use config::*;
pub use constants::*;
pub use error::*;
pub use metrics::*;
pub use stats::*;
