//! Paginated fetcher
//!
//! Drives sequential page requests against one endpoint. Page N+1 is never
//! requested before page N has been decoded, because the next request's
//! window may come from page N's response.

use super::types::{PageResult, PaginationState, Termination, WindowMode};
use crate::decode::PageDecoder;
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::types::{format_timestamp, TimeWindow};
use futures::{Stream, TryStreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

/// Sequential fetcher over a time-windowed, paginated endpoint
///
/// A fetcher is consumed by [`run`](Self::run); build a new one to fetch
/// again.
pub struct PaginatedFetcher {
    transport: Arc<dyn Transport>,
    decoder: Arc<dyn PageDecoder>,
    base_url: Url,
    path: String,
    window: TimeWindow,
    termination: Termination,
    window_mode: WindowMode,
    cancel: CancellationToken,
}

impl PaginatedFetcher {
    /// Start building a fetcher around a transport and a decoder
    pub fn builder(
        transport: Arc<dyn Transport>,
        decoder: Arc<dyn PageDecoder>,
    ) -> PaginatedFetcherBuilder {
        PaginatedFetcherBuilder {
            transport,
            decoder,
            base_url: None,
            path: String::new(),
            window: None,
            termination: Termination::default(),
            window_mode: WindowMode::default(),
            cancel: None,
        }
    }

    /// Initial window
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// Termination condition
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Window mode
    pub fn window_mode(&self) -> WindowMode {
        self.window_mode
    }

    /// Token that aborts a run before its next page
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Fetch and decode the page `state` points at
    ///
    /// Does not touch `state`; the caller advances it from the result.
    pub async fn fetch_next_page(&self, state: &PaginationState) -> Result<PageResult> {
        state.validate()?;

        let request = state.request(&self.base_url, &self.path);
        let url = request.url()?;

        debug!(page = request.page, %url, "requesting page");
        let body = self.transport.get(&url).await?;
        let meta = self.decoder.decode(&body, &request)?;

        Ok(PageResult::new(request.page, url, body, meta))
    }

    /// Lazily fetch pages in order
    ///
    /// The stream ends after the termination condition is met or right after
    /// the first error, which is tagged with the failing page number. When
    /// the cancellation token fires the in-flight request is dropped and the
    /// stream ends with [`Error::Cancelled`].
    pub fn run(self) -> impl Stream<Item = Result<PageResult>> + Send + 'static {
        async_stream::try_stream! {
            let mut state = PaginationState::new(self.window);
            info!(
                path = %self.path,
                window = %self.window,
                termination = ?self.termination,
                mode = ?self.window_mode,
                "starting pagination"
            );

            while self.termination.should_fetch(&state) {
                let page = state.current_page;

                // Cancellation wins over a ready response; an already-cancelled
                // token resolves before the request is ever sent.
                let fetched = tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => Err(Error::Cancelled { page }),
                    fetched = self.fetch_next_page(&state) => fetched.map_err(|e| e.at_page(page)),
                };
                let result = fetched?;

                state
                    .advance(&result, self.window_mode)
                    .map_err(|e| e.at_page(page))?;

                debug!(
                    page,
                    start = %format_timestamp(&state.current_window_start),
                    end = %format_timestamp(&state.current_window_end),
                    last = result.is_last_page,
                    "page processed"
                );
                yield result;
            }

            info!(pages = state.current_page - 1, "pagination complete");
        }
    }

    /// Run to completion and collect every page
    pub async fn fetch_all(self) -> Result<Vec<PageResult>> {
        self.run().try_collect().await
    }
}

impl std::fmt::Debug for PaginatedFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedFetcher")
            .field("base_url", &self.base_url.as_str())
            .field("path", &self.path)
            .field("window", &self.window)
            .field("termination", &self.termination)
            .field("window_mode", &self.window_mode)
            .finish_non_exhaustive()
    }
}

/// Builder for [`PaginatedFetcher`]
pub struct PaginatedFetcherBuilder {
    transport: Arc<dyn Transport>,
    decoder: Arc<dyn PageDecoder>,
    base_url: Option<String>,
    path: String,
    window: Option<TimeWindow>,
    termination: Termination,
    window_mode: WindowMode,
    cancel: Option<CancellationToken>,
}

impl PaginatedFetcherBuilder {
    /// Set the API base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the endpoint path
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the initial window
    #[must_use]
    pub fn window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Request exactly `total` pages
    #[must_use]
    pub fn total_pages(self, total: u32) -> Self {
        self.termination(Termination::TotalPages(total))
    }

    /// Request until a page reports it is the last one
    #[must_use]
    pub fn until_last_page(self, max_pages: Option<u32>) -> Self {
        self.termination(Termination::UntilLastPage { max_pages })
    }

    /// Set the termination condition
    #[must_use]
    pub fn termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    /// Set how window bounds move between pages
    #[must_use]
    pub fn window_mode(mut self, mode: WindowMode) -> Self {
        self.window_mode = mode;
        self
    }

    /// Share a cancellation token with the caller
    #[must_use]
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<PaginatedFetcher> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::config("base_url is required"))?;
        let base_url = Url::parse(&base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "base_url '{base_url}' cannot carry a path"
            )));
        }

        let window = self
            .window
            .ok_or_else(|| Error::config("window is required"))?;
        window.validate()?;

        let unbounded = matches!(
            self.termination,
            Termination::UntilLastPage { max_pages: None }
        );
        if unbounded && !self.decoder.signals_last_page() {
            return Err(Error::config(
                "decoder never reports a last page; set total_pages or max_pages",
            ));
        }

        Ok(PaginatedFetcher {
            transport: self.transport,
            decoder: self.decoder,
            base_url,
            path: self.path,
            window,
            termination: self.termination,
            window_mode: self.window_mode,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}
