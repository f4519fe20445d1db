//! In-memory query client
//!
//! Provides a `QueryClient` that stores the latest state of each keyed query
//! together with the time it last succeeded, so fresh results can be reused
//! by later mounts without another request.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Display;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;

use super::{Fetcher, QueryError, QueryLayer, QueryState};

/// Upper bound for the delay between two retries
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Tuning for fetch reuse and retries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a successful result counts as fresh
    pub stale_time: Duration,
    /// Number of retries after the first failed attempt
    pub retry: u32,
    /// Delay before the first retry; doubles on every further attempt
    pub retry_delay: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(300), // 5 minutes
            retry: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl QueryOptions {
    /// Delay to wait after the given failed attempt (0-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(16);
        self.retry_delay.saturating_mul(factor).min(MAX_RETRY_DELAY)
    }
}

/// Cached state of one key
#[derive(Debug)]
struct Entry<T, E> {
    /// Last state exposed to callers
    state: QueryState<T, E>,
    /// When the last successful fetch finished
    updated_at: Option<DateTime<Utc>>,
    /// Whether a fetch task is running for this key
    fetching: bool,
}

impl<T, E> Entry<T, E> {
    fn pending() -> Self {
        Self {
            state: QueryState::Pending,
            updated_at: None,
            fetching: false,
        }
    }

    fn is_stale(&self, stale_time: Duration) -> bool {
        match self.updated_at {
            Some(at) => {
                let age = (Utc::now() - at).to_std().unwrap_or_default();
                age >= stale_time
            }
            None => true,
        }
    }
}

type Entries<T, E> = Arc<Mutex<HashMap<String, Entry<T, E>>>>;

/// Keyed cache of asynchronous results
///
/// Clones share the same cache, so a view that is torn down and mounted
/// again sees the results its predecessor fetched. Fetches run on spawned
/// tokio tasks and must be started from within a runtime.
pub struct QueryClient<T, E> {
    entries: Entries<T, E>,
    options: QueryOptions,
}

impl<T, E> Clone for QueryClient<T, E> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            options: self.options.clone(),
        }
    }
}

impl<T, E> QueryClient<T, E>
where
    T: Send + Sync + 'static,
    E: Display + Send + Sync + 'static,
{
    /// Creates an empty client with the given options
    pub fn new(options: QueryOptions) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            options,
        }
    }

    /// Spawns the fetch for `key` and records its outcome when it finishes
    fn spawn_fetch(&self, key: String, fetcher: Fetcher<T, E>) {
        let entries = Arc::clone(&self.entries);
        let options = self.options.clone();

        tokio::spawn(async move {
            let outcome = AssertUnwindSafe(fetch_with_retry(&key, &fetcher, &options))
                .catch_unwind()
                .await;

            let state = match outcome {
                Ok(Ok(data)) => {
                    tracing::debug!(key = %key, "query succeeded");
                    QueryState::Success(Arc::new(data))
                }
                Ok(Err(err)) => {
                    tracing::warn!(key = %key, error = %err, "query failed");
                    QueryState::Error(Arc::new(QueryError::Failed(err)))
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(key = %key, panic = %message, "query fetch panicked");
                    QueryState::Error(Arc::new(QueryError::Unknown(message)))
                }
            };

            let mut entries = lock(&entries);
            let entry = entries.entry(key).or_insert_with(Entry::pending);
            if matches!(state, QueryState::Success(_)) {
                entry.updated_at = Some(Utc::now());
            }
            entry.state = state;
            entry.fetching = false;
        });
    }
}

impl<T, E> QueryLayer<T, E> for QueryClient<T, E>
where
    T: Send + Sync + 'static,
    E: Display + Send + Sync + 'static,
{
    fn query(&self, key: &str, fetcher: &Fetcher<T, E>) -> QueryState<T, E> {
        let mut entries = lock(&self.entries);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(Entry::pending);

        if entry.fetching {
            tracing::debug!(key = %key, "query already in flight");
            return entry.state.clone();
        }

        let needs_fetch = match entry.state {
            QueryState::Pending | QueryState::Error(_) => true,
            QueryState::Success(_) => entry.is_stale(self.options.stale_time),
        };
        if !needs_fetch {
            tracing::debug!(key = %key, "query served from cache");
            return entry.state.clone();
        }

        // Stale data stays visible while it refetches; errors do not.
        if matches!(entry.state, QueryState::Error(_)) {
            entry.state = QueryState::Pending;
        }
        entry.fetching = true;
        let state = entry.state.clone();
        drop(entries);

        tracing::info!(key = %key, "starting query fetch");
        self.spawn_fetch(key.to_string(), Arc::clone(fetcher));
        state
    }

    fn state(&self, key: &str) -> QueryState<T, E> {
        lock(&self.entries)
            .get(key)
            .map(|entry| entry.state.clone())
            .unwrap_or(QueryState::Pending)
    }

    fn is_fetching(&self, key: &str) -> bool {
        lock(&self.entries)
            .get(key)
            .map(|entry| entry.fetching)
            .unwrap_or(false)
    }
}

/// Runs the fetcher, retrying failures with exponential backoff
async fn fetch_with_retry<T, E: Display>(
    key: &str,
    fetcher: &Fetcher<T, E>,
    options: &QueryOptions,
) -> Result<T, E> {
    let mut attempt = 0;
    loop {
        match fetcher().await {
            Ok(data) => return Ok(data),
            Err(err) if attempt < options.retry => {
                let delay = options.delay_for_attempt(attempt);
                tracing::warn!(
                    key = %key,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "query fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Locks the entry map, recovering it if a previous holder panicked
fn lock<T, E>(entries: &Entries<T, E>) -> MutexGuard<'_, HashMap<String, Entry<T, E>>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Extracts a readable message from a panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
