//! Background fetch tasks.
//!
//! Each fetch runs in its own tokio task and reports back exactly once over
//! the controller's event channel, even if the provider panics.

use super::ControllerEvent;
use crate::feed::PageRequest;
use crate::provider::{ItemProvider, ProviderError};
use crate::search::SearchRequest;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// A panicking provider would otherwise leave the owning state stuck in a
/// loading phase forever, since no resolution event would ever arrive.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

fn panic_to_error(task: &'static str, panic_msg: String) -> ProviderError {
    tracing::error!(task, error = %panic_msg, "Background task panicked");
    ProviderError::Unavailable(format!("{} task panicked: {}", task, panic_msg))
}

/// Spawn a page fetch for `request`.
pub(super) fn spawn_page_fetch(
    provider: Arc<dyn ItemProvider>,
    request: PageRequest,
    tx: mpsc::Sender<ControllerEvent>,
) {
    tokio::spawn(async move {
        let cursor = request.cursor;
        let result = catch_task_panic(provider.fetch_page(cursor.page_number, cursor.page_size))
            .await
            .unwrap_or_else(|panic_msg| Err(panic_to_error("page_fetch", panic_msg)));

        if let Err(e) = tx.send(ControllerEvent::PageLoaded { request, result }).await {
            tracing::warn!(error = %e, "Failed to send page result (receiver dropped)");
        }
    });
}

/// Spawn a search for `request`.
pub(super) fn spawn_search(
    provider: Arc<dyn ItemProvider>,
    request: SearchRequest,
    tx: mpsc::Sender<ControllerEvent>,
) {
    tokio::spawn(async move {
        let result = catch_task_panic(provider.search_items(&request.query))
            .await
            .unwrap_or_else(|panic_msg| Err(panic_to_error("search", panic_msg)));

        if let Err(e) = tx
            .send(ControllerEvent::SearchCompleted { request, result })
            .await
        {
            tracing::warn!(error = %e, "Failed to send search results (receiver dropped)");
        }
    });
}
