use axum::{
    debug_handler,
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub use axum::http::StatusCode;

/// How the mock poster endpoint responds.
#[derive(Clone, Copy, Debug)]
pub struct Behavior {
    pub status: StatusCode,
    pub delay: Duration,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            delay: Duration::ZERO,
        }
    }
}

impl Behavior {
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }
}

/// Request counters, shared with the handlers.
#[derive(Debug, Default)]
pub struct Hits {
    poster: AtomicU64,
    movies: std::sync::Mutex<std::collections::HashMap<String, u64>>,
}

impl Hits {
    /// Total `GET /poster` requests received.
    pub fn poster(&self) -> u64 {
        self.poster.load(Ordering::Relaxed)
    }

    /// `GET /poster` requests received for a given `movie` query value.
    pub fn movie(&self, movie: &str) -> u64 {
        self.movies
            .lock()
            .map(|movies| movies.get(movie).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn record(&self, movie: &str) {
        self.poster.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut movies) = self.movies.lock() {
            *movies.entry(movie.to_string()).or_default() += 1;
        }
    }
}

#[derive(Clone)]
struct AppState {
    behavior: Behavior,
    hits: Arc<Hits>,
}

/// A running mock server.
pub struct MockService {
    pub addr: SocketAddr,
    pub hits: Arc<Hits>,
    handle: JoinHandle<()>,
}

impl MockService {
    /// Base URL, e.g. `http://127.0.0.1:41234`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn router(behavior: Behavior, hits: Arc<Hits>) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/poster", get(poster))
        .with_state(AppState { behavior, hits })
        .layer(TraceLayer::new_for_http())
}

/// Serve on `addr` until the process exits.
pub async fn run(addr: SocketAddr, behavior: Behavior) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Mock poster service listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(behavior, Arc::new(Hits::default()))).await
}

/// Serve on an ephemeral localhost port in the background.
pub async fn spawn(behavior: Behavior) -> std::io::Result<MockService> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let hits = Arc::new(Hits::default());
    let app = router(behavior, hits.clone());

    let handle = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!("Mock service stopped: {err}");
        }
    });
    debug!("Mock poster service spawned on {addr}");

    Ok(MockService { addr, hits, handle })
}

async fn welcome() -> &'static str {
    "Successfully connected"
}

#[derive(Deserialize)]
struct PosterQuery {
    movie: String,
}

#[debug_handler]
async fn poster(
    State(state): State<AppState>,
    Query(query): Query<PosterQuery>,
) -> (StatusCode, String) {
    state.hits.record(&query.movie);

    if !state.behavior.delay.is_zero() {
        tokio::time::sleep(state.behavior.delay).await;
    }

    let body = if state.behavior.status.is_success() {
        format!("https://posters.invalid/{}.jpg", query.movie)
    } else {
        "Failed to fetch poster image".to_string()
    };
    (state.behavior.status, body)
}
