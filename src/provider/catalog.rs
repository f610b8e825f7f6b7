use super::{ItemProvider, ProviderError};
use crate::model::Item;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Maximum catalog file size (8 MB).
const MAX_CATALOG_FILE_SIZE: u64 = 8 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog file too large: {0} bytes")]
    TooLarge(u64),
}

/// Static, ordered catalog served from memory.
///
/// Pages are contiguous slices of the catalog. Search is a case-insensitive
/// substring match over `title` and `location`, preserving catalog order.
///
/// `Arc<Vec<Item>>` keeps clones of the provider O(1).
#[derive(Debug, Clone)]
pub struct CatalogProvider {
    items: Arc<Vec<Item>>,
    latency: Option<Duration>,
}

impl CatalogProvider {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: Arc::new(items),
            latency: None,
        }
    }

    /// Delay every response by `latency` (simulates a remote source).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Load a catalog from a JSON array of items.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let meta = std::fs::metadata(path)?;
        if meta.len() > MAX_CATALOG_FILE_SIZE {
            return Err(CatalogError::TooLarge(meta.len()));
        }
        let content = std::fs::read_to_string(path)?;
        let items: Vec<Item> = serde_json::from_str(&content)?;
        tracing::info!(path = %path.display(), count = items.len(), "Loaded catalog");
        Ok(Self::new(items))
    }

    /// Built-in storefront catalog used when nothing else is configured.
    pub fn demo() -> Self {
        const STORES: &[(&str, &str, &str, &str)] = &[
            ("s01", "Corner Cafe", "Lisbon", "cafe"),
            ("s02", "Blue Door Bakery", "Porto", "bakery"),
            ("s03", "Cafe Aurora", "Madrid", "cafe"),
            ("s04", "Green Leaf Grocers", "Lisbon", "grocery"),
            ("s05", "The Book Nook", "Seville", "books"),
            ("s06", "Harbor Fish Market", "Porto", "market"),
            ("s07", "Espresso Lab", "Valencia", "cafe"),
            ("s08", "Olive & Thyme", "Granada", "deli"),
            ("s09", "Pixel Repair Shop", "Madrid", "electronics"),
            ("s10", "Sunrise Florist", "Faro", "florist"),
            ("s11", "Cafe Central", "Coimbra", "cafe"),
            ("s12", "Vinyl Corner", "Lisbon", "music"),
        ];

        let items = STORES
            .iter()
            .map(|(id, title, location, category)| Item {
                category: Some((*category).to_string()),
                ..Item::new(*id, *title, *location)
            })
            .collect();
        Self::new(items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn matches_query(item: &Item, needle: &str) -> bool {
    item.title.to_lowercase().contains(needle) || item.location.to_lowercase().contains(needle)
}

#[async_trait]
impl ItemProvider for CatalogProvider {
    async fn fetch_page(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> Result<Vec<Item>, ProviderError> {
        self.simulate_latency().await;

        if page_number == 0 || page_size == 0 {
            return Err(ProviderError::Unavailable(format!(
                "invalid page request: page={} size={}",
                page_number, page_size
            )));
        }

        let start = (page_number as usize - 1).saturating_mul(page_size as usize);
        let page: Vec<Item> = self
            .items
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect();

        tracing::debug!(page = page_number, size = page_size, count = page.len(), "Catalog page served");
        Ok(page)
    }

    async fn search_items(&self, query: &str) -> Result<Vec<Item>, ProviderError> {
        self.simulate_latency().await;

        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .items
            .iter()
            .filter(|item| matches_query(item, &needle))
            .cloned()
            .collect())
    }
}
