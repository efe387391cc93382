//! Pagination module
//!
//! Sequential page-number pagination over a time window, with optional
//! window rotation.
//!
//! # Overview
//!
//! Every request carries `startTime`, `endTime` and `page`. The
//! [`PaginatedFetcher`] owns a [`PaginationState`] for the duration of one
//! run, asks the injected decoder what each response says about the next
//! page, and advances the state only from that answer.

mod fetcher;
mod types;

pub use fetcher::{PaginatedFetcher, PaginatedFetcherBuilder};
pub use types::{
    PageRequest, PageResult, PaginationState, Termination, WindowMode, END_TIME_PARAM,
    PAGE_PARAM, START_TIME_PARAM,
};
