mod utils;

use mock_service::{Behavior, StatusCode};
use poster_load::{poster, set_target};
use stampede::prelude::*;
use utils::{init, short_stages};

#[tokio::test(flavor = "multi_thread")]
#[ntest::timeout(60_000)]
async fn server_errors_are_recorded() {
    init();
    let service = mock_service::spawn(Behavior::status(StatusCode::INTERNAL_SERVER_ERROR))
        .await
        .unwrap();
    set_target(&service.url()).unwrap();

    let stats = poster().stages(short_stages()).await.unwrap();

    assert_eq!(stats.max_vus, 5);
    assert!(stats.error > 0);
    assert_eq!(stats.success, 0);
    assert_eq!(stats.error_rate, 1.);
    assert_eq!(stats.success_rate(), 0.);
    assert_eq!(service.hits.poster(), stats.iterations);
}
