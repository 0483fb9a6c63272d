//! Search index trait and result types

use crate::car_details::{CarDetails, CarDetailsError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum SearchIndexError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index document error: {0}")]
    Document(#[from] CarDetailsError),

    #[error("Search was cancelled")]
    Cancelled,

    #[error("Search index lock poisoned")]
    Poisoned,
}

/// One page of hits plus the total number of matches before pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHits {
    pub total_hits: usize,
    pub ids: Vec<String>,
}

/// Cancellation signal for a query: an explicit token and an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: CancellationToken) -> Self {
        SearchContext {
            token,
            deadline: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once the token is cancelled or the deadline has passed.
    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// A persistent full-text index of car details, keyed by car name.
pub trait SearchIndex: Send + Sync {
    /// Index `details` under `car_id`, replacing any previous document.
    fn put(&self, car_id: &str, details: &CarDetails) -> Result<(), SearchIndexError>;

    /// Remove the document for `car_id`. Removing an absent document is not an error.
    fn remove(&self, car_id: &str) -> Result<(), SearchIndexError>;

    /// Drop every document and index `documents` instead, atomically.
    fn replace_all(&self, documents: &[(&str, &CarDetails)]) -> Result<(), SearchIndexError>;

    /// Run a query. An empty (or blank) term matches every document, ordered by
    /// car name; otherwise hits are ranked by relevance.
    fn query(
        &self,
        term: &str,
        page_size: usize,
        offset: usize,
        ctx: &SearchContext,
    ) -> Result<SearchHits, SearchIndexError>;

    /// The stored document for `car_id`, if indexed.
    fn document(&self, car_id: &str) -> Result<Option<CarDetails>, SearchIndexError>;

    /// Number of indexed documents.
    fn len(&self) -> Result<usize, SearchIndexError>;

    fn is_empty(&self) -> Result<bool, SearchIndexError> {
        Ok(self.len()? == 0)
    }

    /// Release the underlying storage.
    fn close(self: Box<Self>) -> Result<(), SearchIndexError>;
}
