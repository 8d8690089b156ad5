use stampede::Stage;
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[allow(unused)]
pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("stampede=debug,poster_load=debug,mock_service=info"));
        let _ = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// A two second profile: ramp to 5 VUs, hold, ramp down.
#[allow(unused)]
pub fn short_stages() -> Vec<Stage> {
    vec![
        Stage::new(Duration::from_millis(500), 5),
        Stage::new(Duration::from_secs(1), 5),
        Stage::new(Duration::from_millis(500), 0),
    ]
}
