//! End-to-end cycles against a fake `/sensor-data` server

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use sensorboard::{
    CycleError, CycleOutcome, HttpSource, MemoryPage, MemorySurface, Poller, Renderer,
    SensorSource, SourceError, DATE_TITLE_ID, HUMIDITY_ID, TEMPERATURE_ID,
};

/// Responses served in order; the last one repeats
#[derive(Clone)]
struct Script {
    responses: Arc<Vec<(StatusCode, &'static str)>>,
    hits: Arc<AtomicUsize>,
}

async fn sensor_data(State(script): State<Script>) -> impl IntoResponse {
    let hit = script.hits.fetch_add(1, Ordering::SeqCst);
    let idx = hit.min(script.responses.len() - 1);
    script.responses[idx]
}

async fn serve(responses: Vec<(StatusCode, &'static str)>) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let script = Script {
        responses: Arc::new(responses),
        hits: Arc::clone(&hits),
    };

    let app = Router::new()
        .route("/sensor-data", get(sensor_data))
        .with_state(script);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), hits)
}

const BATCH: &str = r#"[
    {"datetime": "2024-01-02 10:00:04", "temperature": "21.5", "humidity": "42"},
    {"datetime": "2024-01-02 10:00:02", "temperature": "21.0", "humidity": "41"},
    {"datetime": "2024-01-02 10:00:00", "temperature": "20.5", "humidity": "40"}
]"#;

fn poller(base_url: &str) -> Poller<HttpSource, MemoryPage, MemorySurface> {
    let mut renderer = Renderer::new();
    renderer.initialize(MemorySurface::default()).unwrap();
    Poller::new(
        HttpSource::new(base_url).unwrap(),
        MemoryPage::dashboard(),
        renderer,
    )
}

#[tokio::test]
async fn test_fetch_decodes_batch() {
    let (url, hits) = serve(vec![(StatusCode::OK, BATCH)]).await;
    let source = HttpSource::new(&url).unwrap();

    let batch = source.fetch().await.unwrap();
    assert_eq!(batch.len(), 3);
    assert_eq!(batch.as_slice()[0].datetime, "2024-01-02 10:00:04");
    assert_eq!(batch.as_slice()[2].temperature, 20.5);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cycle_renders_chronologically() {
    let (url, _hits) = serve(vec![(StatusCode::OK, BATCH)]).await;
    let poller = poller(&url);

    let outcome = poller.run_cycle().await;
    assert_eq!(outcome, Some(CycleOutcome::Rendered { readings: 3 }));

    let page = poller.page();
    assert_eq!(page.text(TEMPERATURE_ID), Some("21.5"));
    assert_eq!(page.text(HUMIDITY_ID), Some("42"));
    assert_eq!(page.text(DATE_TITLE_ID), Some("2024-01-02"));

    let renderer = poller.renderer();
    let model = renderer.model().unwrap();
    assert_eq!(model.labels, vec!["10:00:00", "10:00:02", "10:00:04"]);
    assert_eq!(model.datasets[0].data, vec![20.5, 21.0, 21.5]);
    assert_eq!(model.datasets[1].data, vec![40.0, 41.0, 42.0]);
}

#[tokio::test]
async fn test_server_error_is_a_cycle_failure() {
    let (url, _hits) = serve(vec![(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error": "Database connection error"}"#,
    )])
    .await;
    let poller = poller(&url);

    let err = poller.fetch_and_render().await.unwrap_err();
    match err {
        CycleError::Source(SourceError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("Database connection error"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_failures_are_swallowed_and_next_cycle_recovers() {
    let (url, hits) = serve(vec![
        (StatusCode::OK, "<html>login</html>"),
        (StatusCode::OK, "[]"),
        (StatusCode::OK, BATCH),
    ])
    .await;
    let poller = poller(&url);

    assert_eq!(poller.run_cycle().await, None);
    assert_eq!(poller.run_cycle().await, Some(CycleOutcome::Empty));
    assert_eq!(poller.page().writes(), 0);
    assert_eq!(
        poller.run_cycle().await,
        Some(CycleOutcome::Rendered { readings: 3 })
    );

    let stats = poller.stats();
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.empty, 1);
    assert_eq!(stats.rendered, 1);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = HttpSource::new(&format!("http://{}", addr)).unwrap();
    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, SourceError::Network(_)));
}
