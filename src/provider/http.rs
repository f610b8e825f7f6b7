use super::{ItemProvider, ProviderError};
use crate::model::Item;
use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_MAX_RESPONSE_BYTES: usize = 5 * 1024 * 1024; // 5MB

/// Item provider backed by a JSON item service.
///
/// Endpoints (relative to the base URL):
///
/// - `GET items?page=N&page_size=M` - one page of the browse collection
/// - `GET items/search?q=QUERY` - unpaged search results
///
/// Both return a JSON array of [`Item`]s. No retries are performed: a failed
/// request is reported once and the caller decides whether to re-issue it.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    max_response_bytes: usize,
}

impl HttpProvider {
    /// `base_url` should already be validated (see [`crate::util::validate_base_url`]).
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self {
            client,
            base_url,
            timeout: DEFAULT_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::Unavailable(format!("bad endpoint '{}': {}", path, e)))
    }

    async fn get_items(&self, url: Url) -> Result<Vec<Item>, ProviderError> {
        let response = tokio::time::timeout(self.timeout, self.client.get(url.clone()).send())
            .await
            .map_err(|_| ProviderError::Timeout)?
            .map_err(ProviderError::Network)?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status().as_u16()));
        }

        let bytes = tokio::time::timeout(
            self.timeout,
            read_limited_bytes(response, self.max_response_bytes),
        )
        .await
        .map_err(|_| ProviderError::Timeout)??;

        // Whole-batch decode: one malformed item fails the entire response
        serde_json::from_slice::<Vec<Item>>(&bytes).map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Failed to decode item batch");
            ProviderError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl ItemProvider for HttpProvider {
    async fn fetch_page(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> Result<Vec<Item>, ProviderError> {
        let mut url = self.endpoint("items")?;
        url.query_pairs_mut()
            .append_pair("page", &page_number.to_string())
            .append_pair("page_size", &page_size.to_string());

        let mut items = self.get_items(url).await?;

        if items.len() > page_size as usize {
            tracing::warn!(
                page = page_number,
                page_size,
                received = items.len(),
                "Provider returned an oversized page, truncating"
            );
            items.truncate(page_size as usize);
        }

        Ok(items)
    }

    async fn search_items(&self, query: &str) -> Result<Vec<Item>, ProviderError> {
        let mut url = self.endpoint("items/search")?;
        url.query_pairs_mut().append_pair("q", query);
        self.get_items(url).await
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ProviderError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ProviderError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ProviderError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ProviderError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
