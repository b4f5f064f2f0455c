//! ProbeDispatcher against a live mock server: ordering, timeouts and
//! outcome classification.

use std::time::Duration;

use apiprobe::http::{BatchMode, PaceSchedule, ProbeDispatcher};
use apiprobe::models::{BODY_SNIPPET_LIMIT, OutcomeKind, ProbeOutcome, ProbeRequest};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

#[tokio::test]
async fn test_concurrent_batch_keeps_input_order() {
    let mock_server = MockServer::start().await;

    // Earlier items answer last.
    Mock::given(method("GET"))
        .and(path_regex(r"^/item/\d+$"))
        .respond_with(|req: &Request| {
            let index: u64 = req
                .url
                .path()
                .trim_start_matches("/item/")
                .parse()
                .unwrap_or(0);
            ResponseTemplate::new(200)
                .set_body_string(req.url.path().to_string())
                .set_delay(Duration::from_millis((5 - index.min(5)) * 40))
        })
        .mount(&mock_server)
        .await;

    let dispatcher = ProbeDispatcher::new(&mock_server.uri(), 8).expect("client");
    let requests: Vec<ProbeRequest> = (0..5)
        .map(|i| ProbeRequest::get(format!("/item/{}", i), 2000))
        .collect();

    let outcomes = dispatcher
        .dispatch_batch(&requests, BatchMode::Concurrent)
        .await;

    let bodies: Vec<&str> = outcomes.iter().filter_map(|o| o.body()).collect();
    assert_eq!(
        bodies,
        vec!["/item/0", "/item/1", "/item/2", "/item/3", "/item/4"]
    );
}

#[tokio::test]
async fn test_paced_batch_sends_every_probe() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(4)
        .mount(&mock_server)
        .await;

    let dispatcher = ProbeDispatcher::new(&mock_server.uri(), 8).expect("client");
    let requests = vec![ProbeRequest::get("/", 2000); 4];
    let schedule = PaceSchedule::new(2, Duration::from_millis(5));

    let outcomes = dispatcher
        .dispatch_batch(&requests, BatchMode::Paced(schedule))
        .await;
    assert_eq!(outcomes.len(), 4);
    assert!(outcomes.iter().all(|o| o.has_status(200)));
}

#[tokio::test]
async fn test_slow_response_is_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
        .mount(&mock_server)
        .await;

    let dispatcher = ProbeDispatcher::new(&mock_server.uri(), 4).expect("client");
    let outcome = dispatcher
        .dispatch(&ProbeRequest::get("/health", 100))
        .await;

    assert_eq!(outcome.kind(), OutcomeKind::Timeout);
    assert!(outcome.status().is_none());
}

#[tokio::test]
async fn test_refused_connection_is_network_error() {
    let dispatcher = ProbeDispatcher::new("http://127.0.0.1:1", 4).expect("client");
    let outcome = dispatcher
        .dispatch(&ProbeRequest::get("/health", 1000))
        .await;

    assert!(matches!(outcome, ProbeOutcome::NetworkError { .. }));
}

#[tokio::test]
async fn test_status_classification() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let dispatcher = ProbeDispatcher::new(&mock_server.uri(), 4).expect("client");

    let down = dispatcher.dispatch(&ProbeRequest::get("/down", 2000)).await;
    assert!(matches!(down, ProbeOutcome::ServerError { status: 503, .. }));
    assert_eq!(down.body(), Some("maintenance"));

    let busy = dispatcher.dispatch(&ProbeRequest::get("/busy", 2000)).await;
    assert_eq!(busy.kind(), OutcomeKind::Success);
    assert!(busy.is_rate_limited());
}

#[tokio::test]
async fn test_body_read_stops_at_limit() {
    let mock_server = MockServer::start().await;

    let body = "x".repeat(BODY_SNIPPET_LIMIT * 4);
    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
        .mount(&mock_server)
        .await;

    let dispatcher = ProbeDispatcher::new(&mock_server.uri(), 4).expect("client");

    let bounded = dispatcher.dispatch(&ProbeRequest::get("/big", 2000)).await;
    assert_eq!(bounded.body().map(str::len), Some(BODY_SNIPPET_LIMIT));

    let full = dispatcher
        .dispatch(&ProbeRequest::get("/big", 2000).with_body_limit(body.len() * 2))
        .await;
    assert_eq!(full.body(), Some(body.as_str()));
}
