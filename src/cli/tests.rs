//! CLI tests

use super::*;
use crate::decode::{DecoderConfig, PageMeta};
use crate::error::Error;
use crate::pagination::{PageResult, Termination, WindowMode};
use crate::types::{parse_timestamp, TimeWindow};
use clap::Parser;
use pretty_assertions::assert_eq;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const START: &str = "2022-11-14T20:00:45.061Z";
const END: &str = "2023-11-21T20:00:45.061Z";

fn flag_args(base_url: &str) -> FetchArgs {
    FetchArgs {
        base_url: Some(base_url.to_string()),
        path: Some("devices/measurements".to_string()),
        start: Some(START.to_string()),
        end: Some(END.to_string()),
        ..FetchArgs::default()
    }
}

#[test]
fn test_parse_fetch_command() {
    let cli = Cli::parse_from([
        "windowed-pager",
        "fetch",
        "--base-url",
        "https://api.example.com",
        "--start",
        START,
        "--end",
        END,
        "--total-pages",
        "23",
        "--rotate-windows",
        "--decoder",
        "page-index",
    ]);

    let Commands::Fetch(args) = cli.command else {
        panic!("expected fetch");
    };
    assert_eq!(args.total_pages, Some(23));
    assert!(args.rotate_windows);
    assert_eq!(args.decoder, Some(DecoderKind::PageIndex));
    assert_eq!(cli.format, OutputFormat::Text);
}

#[test]
fn test_total_pages_conflicts_with_until_last_page() {
    let parsed = Cli::try_parse_from([
        "windowed-pager",
        "fetch",
        "--total-pages",
        "3",
        "--until-last-page",
    ]);
    assert!(parsed.is_err());
}

#[test]
fn test_resolve_config_from_flags() {
    let mut args = flag_args("https://api.example.com");
    args.total_pages = Some(23);
    args.rotate_windows = true;
    args.decoder = Some(DecoderKind::PageIndex);
    args.max_retries = Some(2);

    let config = resolve_config(&args).unwrap();

    assert_eq!(config.base_url, "https://api.example.com");
    assert_eq!(config.path, "devices/measurements");
    assert_eq!(config.termination(), Termination::TotalPages(23));
    assert_eq!(config.window_mode, WindowMode::Rotate);
    assert_eq!(config.decoder, DecoderConfig::PageIndex);
    assert_eq!(config.http.max_retries, 2);
}

#[test]
fn test_resolve_config_requires_flags_without_file() {
    let mut args = flag_args("https://api.example.com");
    args.start = None;

    let err = resolve_config(&args).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
    assert!(err.to_string().contains("--start"));
}

#[test]
fn test_resolve_config_rejects_unbounded_page_index() {
    let mut args = flag_args("https://api.example.com");
    args.decoder = Some(DecoderKind::PageIndex);

    let err = resolve_config(&args).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));

    args.max_pages = Some(10);
    assert!(resolve_config(&args).is_ok());
}

#[test]
fn test_page_bound_flag_completes_page_index_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("fetch.json");
    std::fs::write(
        &file,
        serde_json::json!({
            "base_url": "https://file.example.com",
            "start_time": START,
            "end_time": END,
            "decoder": {"type": "page_index"}
        })
        .to_string(),
    )
    .unwrap();

    let mut args = FetchArgs {
        config: Some(file),
        ..FetchArgs::default()
    };
    assert!(matches!(resolve_config(&args), Err(Error::Config { .. })));

    args.max_pages = Some(3);
    assert_eq!(
        resolve_config(&args).unwrap().termination(),
        Termination::UntilLastPage { max_pages: Some(3) }
    );
}

#[test]
fn test_resolve_config_flags_override_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("fetch.yaml");
    std::fs::write(
        &file,
        format!(
            "base_url: https://file.example.com\npath: events\nstart_time: \"{START}\"\nend_time: \"{END}\"\ntotal_pages: 10\n"
        ),
    )
    .unwrap();

    let args = FetchArgs {
        config: Some(file),
        path: Some("other".to_string()),
        until_last_page: true,
        max_pages: Some(4),
        ..FetchArgs::default()
    };
    let config = resolve_config(&args).unwrap();

    assert_eq!(config.base_url, "https://file.example.com");
    assert_eq!(config.path, "other");
    assert_eq!(
        config.termination(),
        Termination::UntilLastPage { max_pages: Some(4) }
    );
}

#[test]
fn test_meta_flag_keeps_custom_meta_paths_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("fetch.yaml");
    std::fs::write(
        &file,
        format!(
            "base_url: https://file.example.com\nstart_time: \"{START}\"\nend_time: \"{END}\"\ntotal_pages: 2\ndecoder:\n  type: meta\n  page_path: paging.current\n  start_path: paging.from\n"
        ),
    )
    .unwrap();

    let args = FetchArgs {
        config: Some(file.clone()),
        decoder: Some(DecoderKind::Meta),
        ..FetchArgs::default()
    };
    let config = resolve_config(&args).unwrap();

    let DecoderConfig::Meta {
        page_path,
        start_path,
        ..
    } = &config.decoder
    else {
        panic!("expected meta decoder, got {:?}", config.decoder);
    };
    assert_eq!(page_path, "paging.current");
    assert_eq!(start_path.as_deref(), Some("paging.from"));

    std::fs::write(
        &file,
        format!(
            "base_url: https://file.example.com\nstart_time: \"{START}\"\nend_time: \"{END}\"\ntotal_pages: 2\ndecoder:\n  type: page_index\n"
        ),
    )
    .unwrap();
    assert_eq!(resolve_config(&args).unwrap().decoder, DecoderConfig::default());
}

#[test]
fn test_status_line() {
    let page = PageResult::new(
        3,
        Url::parse("https://api.example.com/events").unwrap(),
        "{}".to_string(),
        PageMeta::more(),
    );
    let window = TimeWindow {
        start: parse_timestamp(START).unwrap(),
        end: parse_timestamp(END).unwrap(),
    };

    assert_eq!(
        status_line(&page, &window),
        "Page 3 processed. New startTime: 2022-11-14T20:00:45.061Z, new endTime: 2023-11-21T20:00:45.061Z"
    );
}

#[tokio::test]
async fn test_runner_fetches_every_page() {
    let server = MockServer::start().await;
    for page in 1..=2 {
        Mock::given(method("GET"))
            .and(path("/devices/measurements"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "meta": {"page": page, "pages": 2, "startTime": START, "endTime": END}
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut args = flag_args(&server.uri());
    args.until_last_page = true;
    let runner = Runner::new(Cli {
        format: OutputFormat::Json,
        verbose: false,
        command: Commands::Fetch(args.clone()),
    });

    assert_eq!(runner.fetch(&args).await.unwrap(), 2);
}

#[tokio::test]
async fn test_runner_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut args = flag_args(&server.uri());
    args.total_pages = Some(3);
    let runner = Runner::new(Cli {
        format: OutputFormat::Text,
        verbose: false,
        command: Commands::Fetch(args.clone()),
    });

    let err = runner.fetch(&args).await.unwrap_err();
    assert_eq!(err.page(), Some(1));
    assert_eq!(err.status(), Some(503));
}
