mod utils;

use metrics_exporter_prometheus::PrometheusBuilder;
use mock_service::Behavior;
use poster_load::{poster, set_target, target, MOVIE};
use stampede::prelude::*;
use utils::{init, short_stages};

#[tokio::test(flavor = "multi_thread")]
#[ntest::timeout(60_000)]
async fn all_requests_succeed() {
    init();
    let metrics = PrometheusBuilder::new().install_recorder().unwrap();
    let service = mock_service::spawn(Behavior::default()).await.unwrap();
    set_target(&service.url()).unwrap();
    assert_eq!(target(), format!("{}/poster?movie=Avengers", service.url()));

    let stats = poster().stages(short_stages()).await.unwrap();

    assert_eq!(stats.max_vus, 5);
    assert!(stats.success > 0);
    assert_eq!(stats.error, 0);
    assert_eq!(stats.interrupted, 0);
    assert_eq!(stats.success_rate(), 1.);

    // Exactly one GET per iteration, every one for the same movie.
    assert_eq!(stats.transactions(), stats.iterations);
    assert_eq!(service.hits.poster(), stats.iterations);
    assert_eq!(service.hits.movie(MOVIE), stats.iterations);

    let rendered = metrics.render();
    assert!(rendered.contains("get_poster_success"), "{rendered}");
    assert!(rendered.contains("get_poster_latency"), "{rendered}");
    assert!(rendered.contains("stampede_vus"), "{rendered}");
}
