//! Transport seam
//!
//! The fetch loop only ever needs "GET this URL and give me the body as
//! text". Keeping that behind a trait lets callers plug in their own client
//! and lets tests script responses without a network.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// Generic HTTP GET capability
///
/// Implementations must map failures onto the crate taxonomy:
/// - [`Error::Transport`](crate::Error::Transport) when no response arrived
/// - [`Error::HttpStatus`](crate::Error::HttpStatus) for non-2xx statuses
/// - [`Error::Io`](crate::Error::Io) when the body could not be read in full
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a single GET and return the full response body
    async fn get(&self, url: &Url) -> Result<String>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &Url) -> Result<String> {
        (**self).get(url).await
    }
}
