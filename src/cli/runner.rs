//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, DecoderKind, FetchArgs, OutputFormat};
use crate::config::{load_config, read_config, FetchConfig};
use crate::decode::DecoderConfig;
use crate::error::{Error, Result};
use crate::pagination::{PageResult, Termination, WindowMode};
use crate::types::{format_timestamp, TimeWindow};
use futures::StreamExt;
use serde_json::{json, Value};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch(args) => self.fetch(args).await.map(|_| ()),
            Commands::Validate { config } => self.validate(config),
        }
    }

    /// Fetch all pages, reporting each one; returns the page count
    pub async fn fetch(&self, args: &FetchArgs) -> Result<u32> {
        let config = resolve_config(args)?;
        let cancel = CancellationToken::new();

        let interrupt = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, abandoning the current request");
                    cancel.cancel();
                }
            }
        });

        let fetcher = config.build_http_fetcher(cancel)?;
        let mode = fetcher.window_mode();
        let mut window = fetcher.window();

        let stream = fetcher.run();
        futures::pin_mut!(stream);

        let mut pages = 0;
        let outcome = loop {
            match stream.next().await {
                Some(Ok(page)) => {
                    window = page.next_window(window, mode);
                    self.report(&page, &window, args.print_body);
                    pages += 1;
                }
                Some(Err(e)) => break Err(e),
                None => break Ok(pages),
            }
        };
        interrupt.abort();

        if outcome.is_ok() {
            info!("Fetched {pages} pages from {}", config.base_url);
        }
        outcome
    }

    /// Print one page in the selected format
    fn report(&self, page: &PageResult, window: &TimeWindow, print_body: bool) {
        match self.cli.format {
            OutputFormat::Text => {
                println!("{}", status_line(page, window));
                if print_body {
                    println!("{}", page.raw_body);
                }
            }
            OutputFormat::Json => {
                let mut line = json!({
                    "page": page.page,
                    "url": page.url.as_str(),
                    "startTime": format_timestamp(&window.start),
                    "endTime": format_timestamp(&window.end),
                    "isLastPage": page.is_last_page,
                    "totalPages": page.total_pages,
                });
                if print_body {
                    line["body"] = page
                        .json()
                        .unwrap_or_else(|_| Value::String(page.raw_body.clone()));
                }
                println!("{line}");
            }
        }
    }

    /// Validate a config file and print the resolved run
    fn validate(&self, path: &Path) -> Result<()> {
        let config = load_config(path)?;
        let window = config.window()?;

        let termination = match config.termination() {
            Termination::TotalPages(total) => format!("{total} pages"),
            Termination::UntilLastPage { max_pages: None } => "until last page".to_string(),
            Termination::UntilLastPage {
                max_pages: Some(max),
            } => format!("until last page (at most {max})"),
        };

        println!("Config is valid");
        println!(
            "  Endpoint: {}/{}",
            config.base_url.trim_end_matches('/'),
            config.path.trim_start_matches('/')
        );
        println!("  Window: {window}");
        println!("  Pages: {termination}");
        println!("  Window mode: {:?}", config.window_mode);
        Ok(())
    }
}

/// `Page {n} processed. New startTime: {start}, new endTime: {end}`
pub fn status_line(page: &PageResult, next_window: &TimeWindow) -> String {
    format!(
        "Page {} processed. New startTime: {}, new endTime: {}",
        page.page,
        format_timestamp(&next_window.start),
        format_timestamp(&next_window.end)
    )
}

/// Merge `--config` with command-line overrides, then validate the result
pub fn resolve_config(args: &FetchArgs) -> Result<FetchConfig> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => {
            let required = |value: &Option<String>, flag: &str| {
                value
                    .clone()
                    .ok_or_else(|| Error::config(format!("--{flag} is required without --config")))
            };
            FetchConfig::new(
                required(&args.base_url, "base-url")?,
                args.path.clone().unwrap_or_default(),
                required(&args.start, "start")?,
                required(&args.end, "end")?,
            )
        }
    };

    if let Some(base_url) = &args.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(path) = &args.path {
        config.path.clone_from(path);
    }
    if let Some(start) = &args.start {
        config.start_time.clone_from(start);
    }
    if let Some(end) = &args.end {
        config.end_time.clone_from(end);
    }

    if let Some(total) = args.total_pages {
        config.total_pages = Some(total);
        config.max_pages = None;
    } else if args.until_last_page || args.max_pages.is_some() {
        config.total_pages = None;
        config.max_pages = args.max_pages;
    }

    if args.rotate_windows {
        config.window_mode = WindowMode::Rotate;
    }
    // `--decoder meta` keeps custom meta paths from the file
    match args.decoder {
        Some(DecoderKind::Meta) if !matches!(config.decoder, DecoderConfig::Meta { .. }) => {
            config.decoder = DecoderConfig::default();
        }
        Some(DecoderKind::PageIndex) => config.decoder = DecoderConfig::PageIndex,
        _ => {}
    }
    if let Some(timeout) = args.timeout_secs {
        config.http.timeout_secs = timeout;
    }
    if let Some(retries) = args.max_retries {
        config.http.max_retries = retries;
    }

    config.validate()?;
    Ok(config)
}
