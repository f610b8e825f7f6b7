//! Item provider abstraction and its implementations.
//!
//! The controller only ever talks to an [`ItemProvider`]; where the items come
//! from is a deployment concern:
//!
//! - [`catalog`] - Static in-memory catalog (bundled or loaded from JSON)
//! - [`http`] - JSON item service reached over HTTP via `reqwest`
//!
//! Every failure is reported as a [`ProviderError`], which collapses into one
//! of two [`FailureKind`]s at the controller boundary.

mod catalog;
mod http;

pub use catalog::{CatalogError, CatalogProvider};
pub use http::HttpProvider;

use crate::model::Item;
use async_trait::async_trait;
use thiserror::Error;

/// Errors an item provider can report for a single request.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body could not be decoded as a batch of items.
    ///
    /// A single malformed item fails the whole batch.
    #[error("Malformed response: {0}")]
    Decode(String),
    /// Response body exceeded the configured size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Provider refused the request for a reason of its own
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// Coarse failure classification exposed for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NetworkFailure,
    ProviderFailure,
}

impl ProviderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::Network(_) | ProviderError::Timeout => FailureKind::NetworkFailure,
            ProviderError::HttpStatus(_)
            | ProviderError::Decode(_)
            | ProviderError::ResponseTooLarge
            | ProviderError::Unavailable(_) => FailureKind::ProviderFailure,
        }
    }
}

/// A paged, filterable source of items.
///
/// Implementations must return at most `page_size` items from
/// [`fetch_page`](ItemProvider::fetch_page); a short or empty page signals
/// that no further pages exist.
#[async_trait]
pub trait ItemProvider: Send + Sync {
    /// Fetch one page of the browsable collection. `page_number` starts at 1.
    async fn fetch_page(&self, page_number: u32, page_size: u32)
        -> Result<Vec<Item>, ProviderError>;

    /// Resolve a query to a single, unpaged result set.
    async fn search_items(&self, query: &str) -> Result<Vec<Item>, ProviderError>;
}
