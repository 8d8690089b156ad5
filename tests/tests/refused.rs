mod utils;

use poster_load::{poster, set_target};
use stampede::prelude::*;
use utils::{init, short_stages};

#[tokio::test(flavor = "multi_thread")]
#[ntest::timeout(60_000)]
async fn connection_refused_is_recorded() {
    init();

    // Grab a free port and close it again so nothing is listening.
    let port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    set_target(&format!("http://127.0.0.1:{port}")).unwrap();

    let stats = poster().stages(short_stages()).await.unwrap();

    assert!(stats.error > 0);
    assert_eq!(stats.success, 0);
    assert_eq!(stats.interrupted, 0);
}
