use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use poster_load::{client, poster, set_target, target, DEFAULT_TARGET};
use stampede::prelude::*;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_LOG_FILTER: &str = "stampede=info,poster_load=info";

/// Ramp virtual users against the movie poster endpoint.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Server hosting `/poster`.
    #[arg(short, long, default_value = DEFAULT_TARGET)]
    target: String,

    /// Replace the built-in ramp profile, e.g. `-s 30s:1000 -s 1m:0`.
    #[arg(short, long = "stage", value_name = "DURATION:TARGET")]
    stages: Vec<Stage>,

    /// Virtual users at the start of the first stage.
    #[arg(long)]
    start_vus: Option<u32>,

    /// Cap on requests per second across all virtual users.
    #[arg(long)]
    rps: Option<NonZeroU32>,

    /// Time in-flight requests get to finish after the last stage.
    #[arg(long, value_parser = humantime::parse_duration)]
    graceful_stop: Option<Duration>,

    /// Serve Prometheus metrics on this address while the test runs.
    #[arg(long)]
    prometheus: Option<SocketAddr>,
}

impl Cli {
    /// The built-in options with any command line overrides applied.
    fn options(&self) -> Options {
        let mut options = poster_load::options();
        if !self.stages.is_empty() {
            options.stages = self.stages.clone();
        }
        if let Some(vus) = self.start_vus {
            options.start_vus = vus;
        }
        options.rps = self.rps.or(options.rps);
        if let Some(grace) = self.graceful_stop {
            options.graceful_stop = grace;
        }
        options
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    FmtSubscriber::builder().with_env_filter(filter).init();

    let cli = Cli::parse();

    if let Some(addr) = cli.prometheus {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!("Serving metrics on http://{addr}/metrics");
    }

    set_target(&cli.target)?;
    client()?;

    let options = cli.options();

    info!(
        "Target {} with stages [{}]",
        target(),
        options
            .stages
            .iter()
            .map(Stage::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let stats = poster().options(options).await?;

    println!("{stats}");
    println!(
        "checks: GET {} succeeded {:.2}% ({} / {})",
        target(),
        stats.success_rate() * 100.,
        stats.success,
        stats.transactions()
    );

    Ok(())
}
