//! Keyed query cache for asynchronous fetches
//!
//! A query is identified by a string key and produced by a [`Fetcher`].
//! Callers see the lifecycle of that fetch as a [`QueryState`]: pending,
//! success with shared data, or error. The in-memory [`QueryClient`]
//! deduplicates concurrent fetches for the same key, reuses fresh results
//! across mounts and retries failed fetches with exponential backoff.
//!
//! Views depend on the [`QueryLayer`] trait rather than the client, so a
//! test can hand them a fake that yields any state without network I/O.

mod client;

pub use client::{QueryClient, QueryOptions};

use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use thiserror::Error;

/// Shareable async function producing the data for one query
pub type Fetcher<T, E> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// Wraps an async closure into a [`Fetcher`]
pub fn fetcher<T, E, F, Fut>(f: F) -> Fetcher<T, E>
where
    T: 'static,
    E: 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// Why a query ended in the error state
#[derive(Debug, Error)]
pub enum QueryError<E> {
    /// The fetcher returned an error
    #[error("{0}")]
    Failed(E),

    /// The fetch task panicked; the payload is not an error the caller knows
    #[error("fetch task panicked: {0}")]
    Unknown(String),
}

/// Lifecycle state of a query
#[derive(Debug)]
pub enum QueryState<T, E> {
    /// No result yet
    Pending,
    /// Most recent successful result
    Success(Arc<T>),
    /// The last fetch failed
    Error(Arc<QueryError<E>>),
}

impl<T, E> Clone for QueryState<T, E> {
    fn clone(&self) -> Self {
        match self {
            QueryState::Pending => QueryState::Pending,
            QueryState::Success(data) => QueryState::Success(Arc::clone(data)),
            QueryState::Error(err) => QueryState::Error(Arc::clone(err)),
        }
    }
}

impl<T, E> QueryState<T, E> {
    /// Returns true while no result is available
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Pending)
    }

    /// Returns the data if the query succeeded
    pub fn data(&self) -> Option<&Arc<T>> {
        match self {
            QueryState::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the error if the query failed
    pub fn error(&self) -> Option<&QueryError<E>> {
        match self {
            QueryState::Error(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Request-state cache as seen by a view
pub trait QueryLayer<T, E>: Send + Sync {
    /// Subscribes to `key`, starting `fetcher` if the key has no usable result
    ///
    /// Called once when a view mounts. Returns the state at the time of
    /// the call; a fetch started here resolves in the background.
    fn query(&self, key: &str, fetcher: &Fetcher<T, E>) -> QueryState<T, E>;

    /// Current state of `key` without triggering any fetch
    fn state(&self, key: &str) -> QueryState<T, E>;

    /// Returns true while a fetch for `key` is running
    ///
    /// Also true when stale data is shown and being refetched.
    fn is_fetching(&self, key: &str) -> bool;
}
