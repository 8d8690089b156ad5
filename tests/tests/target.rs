use poster_load::{set_target, target, TargetError, DEFAULT_POSTER_URL};

#[test]
fn target_is_set_once() {
    assert_eq!(target(), DEFAULT_POSTER_URL);

    set_target("http://127.0.0.1:3000").unwrap();
    assert_eq!(target(), "http://127.0.0.1:3000/poster?movie=Avengers");

    let err = set_target("http://127.0.0.1:4000").unwrap_err();
    assert!(matches!(err, TargetError::AlreadySet(_)));
    assert_eq!(target(), "http://127.0.0.1:3000/poster?movie=Avengers");
}
