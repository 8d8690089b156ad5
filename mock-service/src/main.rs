use axum::http::StatusCode;
use clap::Parser;
use mock_service::Behavior;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Stand-in for the movie poster service.
#[derive(Parser, Debug)]
struct Cli {
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Status code returned by `/poster`.
    #[arg(short, long, default_value_t = 200)]
    status: u16,

    /// Artificial latency added to every `/poster` response.
    #[arg(short, long, value_parser = humantime::parse_duration, default_value = "0ms")]
    delay: Duration,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_service=info,tower_http=warn")),
        )
        .init();

    let cli = Cli::parse();
    let behavior = Behavior {
        status: StatusCode::from_u16(cli.status)?,
        delay: cli.delay,
    };

    mock_service::run(cli.addr, behavior).await?;
    Ok(())
}
