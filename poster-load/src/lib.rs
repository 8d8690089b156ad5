//! Load test for the movie poster endpoint.
//!
//! Every virtual user repeatedly fetches the poster for one movie while the number of virtual users
//! ramps 0 → 1,000 → 5,000 → 10,000, holds, and ramps back down to 0 over five minutes.
use reqwest::Client;
use stampede::prelude::*;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Server the poster endpoint lives on unless [`set_target`] says otherwise.
pub const DEFAULT_TARGET: &str = "http://localhost:8080";

/// `DEFAULT_TARGET` plus the fixed path and query.
pub const DEFAULT_POSTER_URL: &str = "http://localhost:8080/poster?movie=Avengers";

pub const POSTER_PATH: &str = "/poster";
pub const MOVIE: &str = "Avengers";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

static CLIENT: OnceLock<Client> = OnceLock::new();
static POSTER_URL: OnceLock<String> = OnceLock::new();

/// The ramp profile.
pub fn stages() -> Vec<Stage> {
    vec![
        Stage::new(Duration::from_secs(30), 1_000), // Ramp up to 1,000 users
        Stage::new(Duration::from_secs(60), 5_000), // Ramp up to 5,000 users
        Stage::new(Duration::from_secs(120), 10_000), // Ramp up to 10,000 users
        Stage::new(Duration::from_secs(60), 10_000), // Hold at 10,000 users
        Stage::new(Duration::from_secs(30), 0),     // Ramp down
    ]
}

/// Scenario options. Only the stages are set, everything else is left at the engine defaults.
pub fn options() -> Options {
    Options {
        stages: stages(),
        ..Default::default()
    }
}

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Invalid target URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Target URL `{0}` cannot be a base for the poster path")]
    NotABase(String),

    #[error("Target has already been set to {0}")]
    AlreadySet(String),
}

/// Build the poster URL (`<base>/poster?movie=Avengers`) for a server.
pub fn poster_url(base: &str) -> Result<Url, TargetError> {
    let mut url = Url::parse(base)?;
    if url.cannot_be_a_base() {
        return Err(TargetError::NotABase(base.to_string()));
    }
    url.set_path(POSTER_PATH);
    url.query_pairs_mut().clear().append_pair("movie", MOVIE);
    Ok(url)
}

/// Point the scenario at a different server. Can only be done once, before the run starts.
pub fn set_target(base: &str) -> Result<(), TargetError> {
    let url = poster_url(base)?.to_string();
    POSTER_URL
        .set(url)
        .map_err(|_| TargetError::AlreadySet(target().to_string()))
}

/// The URL every iteration requests.
pub fn target() -> &'static str {
    POSTER_URL
        .get()
        .map(String::as_str)
        .unwrap_or(DEFAULT_POSTER_URL)
}

#[derive(Debug, Error)]
pub enum PosterError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Poster request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// The HTTP client shared by every virtual user, built on first use.
pub fn client() -> Result<&'static Client, PosterError> {
    if let Some(client) = CLIENT.get() {
        return Ok(client);
    }
    let client = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(PosterError::Client)?;
    Ok(CLIENT.get_or_init(|| client))
}

/// Default entry point run by every virtual user, once per iteration.
#[scenario]
pub async fn poster() {
    let _ = get_poster().await;
}

/// One `GET /poster?movie=Avengers`. Non-2xx responses count as errors.
#[transaction]
pub async fn get_poster() -> Result<(), PosterError> {
    client()?.get(target()).send().await?.error_for_status()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_runs_five_minutes() {
        let total: Duration = stages().iter().map(|s| s.duration).sum();
        assert_eq!(total, Duration::from_secs(5 * 60));
    }

    #[test]
    fn profile_targets() {
        let targets: Vec<_> = stages().iter().map(|s| s.target).collect();
        assert_eq!(targets, [1_000, 5_000, 10_000, 10_000, 0]);
        assert!(targets[..4].windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(targets.last(), Some(&0));
    }

    #[test]
    fn profile_matches_duration_strings() {
        let parsed: Vec<Stage> = ["30s:1000", "1m:5000", "2m:10000", "1m:10000", "30s:0"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(parsed, stages());
    }

    #[test]
    fn only_stages_are_set() {
        let options = options();
        assert_eq!(
            options,
            Options {
                stages: stages(),
                ..Default::default()
            }
        );
        assert_eq!(options.start_vus, 0);
        assert!(options.rps.is_none());
    }

    #[test]
    fn default_url() {
        assert_eq!(
            poster_url(DEFAULT_TARGET).unwrap().as_str(),
            DEFAULT_POSTER_URL
        );
    }

    #[test]
    fn url_replaces_path_and_query() {
        let url = poster_url("http://127.0.0.1:3000/ignored?movie=Thor&x=1").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:3000/poster?movie=Avengers");
    }

    #[test]
    fn bad_urls() {
        assert!(matches!(
            poster_url("localhost:8080"),
            Err(TargetError::NotABase(_))
        ));
        assert!(matches!(
            poster_url("not a url"),
            Err(TargetError::InvalidUrl(_))
        ));
    }

    #[test]
    fn client_is_shared() {
        let a = client().unwrap();
        let b = client().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn default_target() {
        // Nothing in this test binary calls `set_target`.
        assert_eq!(target(), DEFAULT_POSTER_URL);
    }
}
