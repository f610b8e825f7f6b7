//! List acquisition controller backing the discovery feed.
//!
//! [`ListController`] owns one [`FeedStore`] and one [`SearchOverlay`] and
//! connects them to an [`ItemProvider`]. Intents run synchronously up to the
//! point of issuing a fetch; the fetch runs as a background tokio task and its
//! outcome comes back as a [`ControllerEvent`] on the controller's channel.
//! The owner of the receiving end feeds those events into
//! [`ListController::handle_event`], one at a time.
//!
//! # Example
//!
//! ```ignore
//! let (mut controller, mut events) = ListController::channel(provider, ControllerOptions::default());
//! controller.load_initial();
//! while let Some(event) = events.recv().await {
//!     controller.handle_event(event);
//!     render(controller.snapshot());
//! }
//! ```

mod task;

use crate::feed::{FeedStore, PageRequest, Resolution};
use crate::model::{ActiveMode, Item};
use crate::provider::{ItemProvider, ProviderError};
use crate::search::{SearchOverlay, SearchRequest};
use crate::snapshot::{self, RenderSnapshot};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Capacity of the event channel created by [`ListController::channel`].
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Resolution of a background fetch.
#[derive(Debug)]
pub enum ControllerEvent {
    /// A feed page fetch finished.
    PageLoaded {
        request: PageRequest,
        result: Result<Vec<Item>, ProviderError>,
    },
    /// A search finished.
    SearchCompleted {
        request: SearchRequest,
        result: Result<Vec<Item>, ProviderError>,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    pub page_size: u32,
    pub max_query_length: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_query_length: crate::search::DEFAULT_MAX_QUERY_LENGTH,
        }
    }
}

/// Controller for a single feed surface (one per screen mount).
pub struct ListController {
    provider: Arc<dyn ItemProvider>,
    feed: FeedStore,
    search: SearchOverlay,
    event_tx: mpsc::Sender<ControllerEvent>,
}

impl ListController {
    pub fn new(
        provider: Arc<dyn ItemProvider>,
        options: ControllerOptions,
        event_tx: mpsc::Sender<ControllerEvent>,
    ) -> Self {
        Self {
            provider,
            feed: FeedStore::new(options.page_size),
            search: SearchOverlay::new(options.max_query_length),
            event_tx,
        }
    }

    /// Create a controller together with the receiver for its events.
    pub fn channel(
        provider: Arc<dyn ItemProvider>,
        options: ControllerOptions,
    ) -> (Self, mpsc::Receiver<ControllerEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        (Self::new(provider, options, tx), rx)
    }

    pub fn feed(&self) -> &FeedStore {
        &self.feed
    }

    pub fn search_overlay(&self) -> &SearchOverlay {
        &self.search
    }

    pub fn mode(&self) -> ActiveMode {
        snapshot::active_mode(self.search.state())
    }

    /// True when neither state has a fetch outstanding.
    pub fn is_settled(&self) -> bool {
        self.feed.phase().is_settled() && self.search.phase().is_settled()
    }

    /// Current read model for the presentation surface.
    pub fn snapshot(&self) -> RenderSnapshot {
        snapshot::render(self.mode(), self.feed.state(), self.search.state())
    }

    fn dispatch_page(&self, request: Option<PageRequest>) -> bool {
        match request {
            Some(request) => {
                task::spawn_page_fetch(Arc::clone(&self.provider), request, self.event_tx.clone());
                true
            }
            None => false,
        }
    }

    fn dispatch_search(&self, request: Option<SearchRequest>) -> bool {
        match request {
            Some(request) => {
                task::spawn_search(Arc::clone(&self.provider), request, self.event_tx.clone());
                true
            }
            None => false,
        }
    }

    /// First load on mount. Returns whether a fetch was issued.
    pub fn load_initial(&mut self) -> bool {
        if self.mode() == ActiveMode::Search {
            tracing::debug!("load_initial ignored in search mode");
            return false;
        }
        let request = self.feed.load_initial();
        self.dispatch_page(request)
    }

    /// Near-end-of-list signal. Returns whether a fetch was issued.
    ///
    /// Search results are unpaged, so this is a no-op in search mode.
    pub fn load_more(&mut self) -> bool {
        if self.mode() == ActiveMode::Search {
            return false;
        }
        let request = self.feed.load_more();
        self.dispatch_page(request)
    }

    /// Pull-to-refresh. Returns whether a fetch was issued.
    ///
    /// In search mode this re-runs the current query instead of touching the
    /// feed.
    pub fn refresh(&mut self) -> bool {
        if self.mode() == ActiveMode::Search {
            let query = self.search.query().to_string();
            let request = self.search.search(&query);
            return self.dispatch_search(request);
        }
        let request = self.feed.refresh();
        self.dispatch_page(request)
    }

    /// Enter, update or (for a blank query) leave search mode. Returns
    /// whether a fetch was issued. Never touches feed state.
    pub fn search(&mut self, query: &str) -> bool {
        let request = self.search.search(query);
        self.dispatch_search(request)
    }

    /// Leave search mode. Feed state resumes exactly where it was.
    pub fn cancel_search(&mut self) {
        self.search.cancel();
    }

    /// Apply a fetch resolution to the state that issued it.
    pub fn handle_event(&mut self, event: ControllerEvent) -> Resolution {
        match event {
            ControllerEvent::PageLoaded { request, result } => self.feed.apply_page(request, result),
            ControllerEvent::SearchCompleted { request, result } => {
                self.search.apply_results(&request, result)
            }
        }
    }
}
