use crate::feed::Resolution;
use crate::model::{Item, Phase};
use crate::provider::ProviderError;
use std::sync::Arc;

/// Maximum allowed search query length, in bytes
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 256;

/// A search the caller must perform on behalf of the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub generation: u64,
    pub query: String,
}

/// Render-facing search state. An empty `query` means search mode is inactive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchState {
    pub query: String,
    pub results: Arc<Vec<Item>>,
    pub phase: Phase,
}

/// Search state machine.
///
/// Every issued search bumps the generation counter, and so does every
/// cancellation. A result is applied only when both its generation and its
/// query still match, so a slow response for an earlier query can never
/// overwrite results for a later one.
#[derive(Debug, Clone)]
pub struct SearchOverlay {
    state: SearchState,
    generation: u64,
    max_query_length: usize,
}

impl Default for SearchOverlay {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUERY_LENGTH)
    }
}

impl SearchOverlay {
    pub fn new(max_query_length: usize) -> Self {
        Self {
            state: SearchState::default(),
            generation: 0,
            max_query_length,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.state.query
    }

    pub fn results(&self) -> &Arc<Vec<Item>> {
        &self.state.results
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while a non-empty query is set.
    pub fn is_active(&self) -> bool {
        !self.state.query.is_empty()
    }

    /// Start (or replace) a search.
    ///
    /// A query that trims to empty cancels search mode. Re-issuing the query
    /// that is already loading is dropped. A query over the length limit is
    /// rejected locally: the overlay enters `Error` without a request.
    pub fn search(&mut self, query: &str) -> Option<SearchRequest> {
        let query = query.trim();
        if query.is_empty() {
            self.cancel();
            return None;
        }

        if query == self.state.query && self.state.phase == Phase::LoadingInitial {
            tracing::debug!(query = %query, "search dropped (same query in flight)");
            return None;
        }

        self.generation = self.generation.wrapping_add(1);
        self.state.query = query.to_string();
        self.state.results = Arc::new(Vec::new());

        if query.len() > self.max_query_length {
            tracing::warn!(
                len = query.len(),
                max = self.max_query_length,
                "Search query too long"
            );
            self.state.phase = Phase::Error;
            return None;
        }

        self.state.phase = Phase::LoadingInitial;
        tracing::debug!(query = %query, generation = self.generation, "search issued");
        Some(SearchRequest {
            generation: self.generation,
            query: self.state.query.clone(),
        })
    }

    /// Leave search mode and discard results. Idempotent.
    pub fn cancel(&mut self) {
        if self.is_active() || self.state.phase != Phase::Idle {
            tracing::debug!(query = %self.state.query, "search cancelled");
        }
        self.generation = self.generation.wrapping_add(1);
        self.state = SearchState::default();
    }

    /// Apply the outcome of a previously issued [`SearchRequest`].
    pub fn apply_results(
        &mut self,
        request: &SearchRequest,
        result: Result<Vec<Item>, ProviderError>,
    ) -> Resolution {
        if request.generation != self.generation || request.query != self.state.query {
            tracing::debug!(
                expected = self.generation,
                got = request.generation,
                query = %request.query,
                "Ignoring stale search result (generation mismatch)"
            );
            return Resolution::Stale;
        }

        match result {
            Ok(items) => {
                tracing::debug!(query = %request.query, count = items.len(), "Search completed");
                self.state.results = Arc::new(items);
                self.state.phase = Phase::Idle;
            }
            Err(e) => {
                tracing::warn!(
                    query = %request.query,
                    failure = ?e.kind(),
                    error = %e,
                    "Search failed"
                );
                self.state.results = Arc::new(Vec::new());
                self.state.phase = Phase::Error;
            }
        }
        Resolution::Applied
    }
}
