#[cfg(feature = "integration")]
mod utils;

#[cfg(feature = "integration")]
mod tests {
    use mock_service::Behavior;
    use poster_load::{options, poster, set_target};
    use stampede::prelude::*;
    use super::utils::init;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread")]
    async fn full_poster_profile() {
        init();
        let service = mock_service::spawn(Behavior {
            delay: Duration::from_millis(50),
            ..Default::default()
        })
        .await
        .unwrap();
        set_target(&service.url()).unwrap();

        let stats = poster().options(options()).await.unwrap();

        assert_eq!(stats.max_vus, 10_000);
        assert_eq!(stats.success_rate(), 1.);
        assert!(stats.elapsed >= Duration::from_secs(5 * 60));
        assert_eq!(service.hits.poster(), stats.iterations);
    }
}
