//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: config → HTTP requests → decoded pages

use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use windowed_pager::decode::{MetaDecoder, PageIndexDecoder};
use windowed_pager::http::{HttpClient, HttpClientConfig};
use windowed_pager::pagination::PaginatedFetcherBuilder;
use windowed_pager::{Error, PaginatedFetcher, TimeWindow, WindowMode};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const START: &str = "2022-11-14T20:00:45.061Z";
const END: &str = "2023-11-21T20:00:45.061Z";

fn window() -> TimeWindow {
    TimeWindow::parse(START, END).unwrap()
}

fn page_body(page: u32, pages: u32, start: &str, end: &str) -> serde_json::Value {
    json!({
        "success": true,
        "meta": {"page": page, "pages": pages, "startTime": start, "endTime": end},
        "measurements": [{"page": page}]
    })
}

async fn mount_page(server: &MockServer, page: u32, body: serde_json::Value, times: u64) {
    Mock::given(method("GET"))
        .and(path("/devices/measurements"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

fn fetcher(server: &MockServer) -> PaginatedFetcherBuilder {
    PaginatedFetcher::builder(
        Arc::new(HttpClient::new().unwrap()),
        Arc::new(MetaDecoder::default()),
    )
    .base_url(server.uri())
    .path("devices/measurements")
    .window(window())
}

// ============================================================================
// Counted Runs
// ============================================================================

#[tokio::test]
async fn test_fetches_exactly_total_pages_in_order() {
    let server = MockServer::start().await;
    for page in 1..=3 {
        Mock::given(method("GET"))
            .and(path("/devices/measurements"))
            .and(query_param("startTime", START))
            .and(query_param("endTime", END))
            .and(query_param("page", page.to_string()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(page_body(page, 5, START, END)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }
    mount_page(&server, 4, page_body(4, 5, START, END), 0).await;

    let pages = fetcher(&server)
        .total_pages(3)
        .build()
        .unwrap()
        .fetch_all()
        .await
        .unwrap();

    let numbers: Vec<u32> = pages.iter().map(|p| p.page).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(pages[2].records("measurements").unwrap(), vec![json!({"page": 3})]);
}

#[tokio::test]
async fn test_zero_total_pages_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pages = fetcher(&server)
        .total_pages(0)
        .build()
        .unwrap()
        .fetch_all()
        .await
        .unwrap();

    assert!(pages.is_empty());
}

#[tokio::test]
async fn test_stops_at_first_failed_page() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page_body(1, 3, START, END), 1).await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, 3, page_body(3, 3, START, END), 0).await;

    let stream = fetcher(&server).total_pages(3).build().unwrap().run();
    let items: Vec<_> = stream.collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap().page, 1);

    let err = items[1].as_ref().unwrap_err();
    assert_eq!(err.page(), Some(2));
    assert_eq!(err.status(), Some(500));
    assert!(matches!(err.root(), Error::HttpStatus { body, .. } if body == "boom"));
}

#[tokio::test]
async fn test_retry_recovers_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, 1, page_body(1, 1, START, END), 1).await;

    let client = HttpClient::with_config(
        HttpClientConfig::builder()
            .max_retries(2)
            .backoff(
                windowed_pager::BackoffType::Constant,
                Duration::from_millis(5),
                Duration::from_millis(5),
            )
            .build(),
    )
    .unwrap();

    let pages = PaginatedFetcher::builder(Arc::new(client), Arc::new(MetaDecoder::default()))
        .base_url(server.uri())
        .path("devices/measurements")
        .window(window())
        .total_pages(1)
        .build()
        .unwrap()
        .fetch_all()
        .await
        .unwrap();

    assert_eq!(pages.len(), 1);
}

// ============================================================================
// Last-Page Runs and Window Rotation
// ============================================================================

#[tokio::test]
async fn test_until_last_page() {
    let server = MockServer::start().await;
    for page in 1..=2 {
        mount_page(&server, page, page_body(page, 2, START, END), 1).await;
    }
    mount_page(&server, 3, page_body(3, 2, START, END), 0).await;

    let pages = fetcher(&server)
        .until_last_page(Some(10))
        .build()
        .unwrap()
        .fetch_all()
        .await
        .unwrap();

    assert_eq!(pages.len(), 2);
    assert!(pages[1].is_last_page);
    assert_eq!(pages[1].total_pages, Some(2));
}

#[tokio::test]
async fn test_rotating_window_follows_response() {
    const NEXT_START: &str = "2023-11-21T20:00:45.061Z";
    const NEXT_END: &str = "2023-12-21T20:00:45.061Z";

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .and(query_param("startTime", START))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(1, 2, NEXT_START, NEXT_END)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .and(query_param("startTime", NEXT_START))
        .and(query_param("endTime", NEXT_END))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(2, 2, NEXT_END, NEXT_END)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let pages = fetcher(&server)
        .total_pages(2)
        .window_mode(WindowMode::Rotate)
        .build()
        .unwrap()
        .fetch_all()
        .await
        .unwrap();

    assert_eq!(pages.len(), 2);
}

#[tokio::test]
async fn test_page_index_decoder_ignores_bodies() {
    let server = MockServer::start().await;
    for page in 1..=2 {
        Mock::given(method("GET"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;
    }

    let pages = PaginatedFetcher::builder(
        Arc::new(HttpClient::new().unwrap()),
        Arc::new(PageIndexDecoder),
    )
    .base_url(server.uri())
    .path("devices/measurements")
    .window(window())
    .total_pages(2)
    .build()
    .unwrap()
    .fetch_all()
    .await
    .unwrap();

    assert_eq!(pages[1].raw_body, "not json");
}

// ============================================================================
// Config-Built Runs
// ============================================================================

#[tokio::test]
async fn test_fetcher_from_yaml_config() {
    let server = MockServer::start().await;
    for page in 1..=2 {
        mount_page(&server, page, page_body(page, 9, START, END), 1).await;
    }

    let yaml = format!(
        r#"
base_url: {}
path: devices/measurements
start_time: "{START}"
end_time: "{END}"
total_pages: 2
http:
  timeout_secs: 5
"#,
        server.uri()
    );
    let config = windowed_pager::config::load_config_from_str(&yaml).unwrap();
    let pages = config
        .build_http_fetcher(CancellationToken::new())
        .unwrap()
        .fetch_all()
        .await
        .unwrap();

    assert_eq!(pages.len(), 2);
}

#[tokio::test]
async fn test_cancel_stops_run() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page_body(1, 5, START, END), 1).await;
    mount_page(&server, 2, page_body(2, 5, START, END), 0).await;

    let fetcher = fetcher(&server).total_pages(5).build().unwrap();
    let cancel = fetcher.cancellation_token();
    let stream = fetcher.run();
    futures::pin_mut!(stream);

    assert_eq!(stream.next().await.unwrap().unwrap().page, 1);
    cancel.cancel();

    let err = stream.next().await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Cancelled { page: 2 }));
    assert!(stream.next().await.is_none());
}
