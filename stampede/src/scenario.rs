//! Scenario logic and configuration
use crate::measurement::Measurement;
use crate::timer::Timer;
use crate::vus::VirtualUserPool;
use stampede_core::{ConfigError, Options, RunStatistics, ScenarioConfig, Stage, REPORT_INTERVAL};
use std::{
    future::Future,
    num::NonZeroU32,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use tokio::time::Instant;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// What awaiting a [`Scenario`] produces.
pub type ScenarioResult = Result<RunStatistics, ConfigError>;

/// Load test scenario structure
///
/// Handler for running scenarios. Not intended for manual creation, use the
/// [`#[scenario]`](stampede_macros::scenario) macro which will add these methods to functions.
#[pin_project::pin_project]
pub struct Scenario<T> {
    func: T,
    runner_fut: Option<Pin<Box<dyn Future<Output = ScenarioResult> + Send>>>,
    config: ScenarioConfig,
}

impl<T> Scenario<T> {
    #[doc(hidden)]
    pub fn new(name: &str, func: T) -> Self {
        Self {
            func,
            runner_fut: None,
            config: ScenarioConfig::new(name),
        }
    }
}

impl<T, F> Future for Scenario<T>
where
    T: Fn() -> F + Send + 'static + Clone + Sync,
    F: Future<Output = ()> + Send + 'static,
{
    type Output = ScenarioResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        if this.runner_fut.is_none() {
            let func = this.func.clone();
            let config = this.config.clone();
            *this.runner_fut = Some(Box::pin(async move { run_scenario(func, config).await }));
        }

        if let Some(runner) = this.runner_fut {
            runner.as_mut().poll(cx)
        } else {
            unreachable!()
        }
    }
}

pub trait ConfigurableScenario<T: Send>: Future<Output = T> + Sized + Send {
    fn options(self, options: Options) -> Self;
    fn stages<I: IntoIterator<Item = Stage>>(self, stages: I) -> Self;
    fn start_vus(self, vus: u32) -> Self;
    fn rps(self, rps: NonZeroU32) -> Self;
    fn graceful_stop(self, grace: Duration) -> Self;
    fn tick(self, tick: Duration) -> Self;
}

impl<T, F> ConfigurableScenario<ScenarioResult> for Scenario<T>
where
    T: Fn() -> F + Send + 'static + Clone + Sync,
    F: Future<Output = ()> + Send + 'static,
{
    /// Replace every option at once.
    ///
    /// # Example
    /// ```no_run
    /// use stampede::prelude::*;
    /// use std::time::Duration;
    ///
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() {
    ///     let options = Options {
    ///         stages: vec![
    ///             Stage::new(Duration::from_secs(30), 100),
    ///             Stage::new(Duration::from_secs(30), 0),
    ///         ],
    ///         ..Default::default()
    ///     };
    ///
    ///     let stats = my_scenario().options(options).await.unwrap();
    ///     println!("{stats}");
    /// }
    ///
    /// #[scenario]
    /// async fn my_scenario() {
    /// }
    /// ```
    fn options(mut self, options: Options) -> Self {
        self.config.options = options;
        self
    }

    /// Set the ramp profile. Virtual users ramp linearly between stage targets.
    ///
    /// # Example
    /// ```ignore
    /// my_scenario()
    ///     .stages([
    ///         Stage::parse("30s", 1_000)?,
    ///         Stage::parse("1m", 1_000)?,
    ///         Stage::parse("30s", 0)?,
    ///     ])
    ///     .await?;
    /// ```
    fn stages<I: IntoIterator<Item = Stage>>(mut self, stages: I) -> Self {
        self.config.options.stages = stages.into_iter().collect();
        self
    }

    /// Number of virtual users at the start of the first stage (default `0`).
    fn start_vus(mut self, vus: u32) -> Self {
        self.config.options.start_vus = vus;
        self
    }

    /// Cap the transaction rate across all virtual users.
    fn rps(mut self, rps: NonZeroU32) -> Self {
        self.config.options.rps = Some(rps);
        self
    }

    /// How long in-flight iterations may keep running once the schedule ends (default `30s`).
    fn graceful_stop(mut self, grace: Duration) -> Self {
        self.config.options.graceful_stop = grace;
        self
    }

    /// How often the VU target is re-evaluated (default `100ms`).
    fn tick(mut self, tick: Duration) -> Self {
        self.config.options.tick = tick;
        self
    }
}

#[instrument(name="scenario", skip_all, fields(name=%config.name))]
pub(crate) async fn run_scenario<T, F>(scenario: T, config: ScenarioConfig) -> ScenarioResult
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = ()> + Send + 'static,
{
    config.validate()?;
    info!(
        "Running {} for {} (peak {} VUs) with config {:?}",
        config.name,
        humantime::format_duration(config.total_duration()?),
        config.max_target(),
        &config.options
    );

    let options = &config.options;
    let mut pool = VirtualUserPool::new(scenario, options.rps);
    let mut timer = Timer::new(options.tick).await;
    let start = Instant::now();
    debug!("Ramp controller ticking every {timer}.");

    let mut total = Measurement::new();
    let mut window = Measurement::new();
    let mut max_vus = 0;

    // NOTE: This loop is time-sensitive. Any long awaits or blocking will throw off the ramp.
    while let Some(target) = config.target_at(start.elapsed()) {
        pool.set_vus(target as usize).await;
        max_vus = max_vus.max(pool.vus());

        #[cfg(feature = "metrics")]
        metrics::gauge!(stampede_core::VUS_GAUGE).set(pool.vus() as f64);

        let elapsed = timer.tick().await;
        let sample = pool.collect();
        total.absorb(&sample, elapsed);
        window.absorb(&sample, elapsed);

        if window.elapsed >= REPORT_INTERVAL {
            info!(
                "[{}] vus={} in_flight={} {window}",
                humantime::format_duration(Duration::from_secs(start.elapsed().as_secs())),
                pool.vus(),
                pool.in_flight(),
            );
            window = Measurement::new();
        }
    }

    debug!("Schedule complete, stopping {} VUs.", pool.in_flight());
    let interrupted = pool.shutdown(options.graceful_stop).await;
    total.absorb(&pool.collect(), timer.since_last_tick());

    #[cfg(feature = "metrics")]
    metrics::gauge!(stampede_core::VUS_GAUGE).set(0.);

    let stats = total.into_statistics(max_vus, interrupted);
    info!("Scenario complete: {stats}");

    Ok(stats)
}
