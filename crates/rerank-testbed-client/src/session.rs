//! Sequential testbed actions against one backend.
//!
//! A session holds the items of the last parse (or combined search) and the
//! last rerank result, and runs at most one action at a time. Starting a
//! second action while one is in flight is refused rather than queued.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use rerank_testbed_core::{Item, RerankResult, has_duplicate_ids};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ClientError;
use crate::traits::SearchBackend;
use crate::types::{ActionKind, QueryRequest, RerankRequest, SearchOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionState {
    #[default]
    Idle,
    Running(ActionKind),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("another action is running: {0}")]
    Busy(ActionKind),

    #[error("no items to rerank; run a parse first")]
    NoItems,

    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, Default)]
struct SessionInner {
    state: ActionState,
    items: Vec<Item>,
    result: Option<RerankResult>,
}

pub struct TestbedSession {
    backend: Arc<dyn SearchBackend>,
    inner: Mutex<SessionInner>,
}

/// Returns the session to `Idle` when the action ends, on success or error.
struct RunningAction<'a> {
    inner: &'a Mutex<SessionInner>,
}

impl Drop for RunningAction<'_> {
    fn drop(&mut self) {
        self.inner.lock().state = ActionState::Idle;
    }
}

impl TestbedSession {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            inner: Mutex::new(SessionInner::default()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn state(&self) -> ActionState {
        self.inner.lock().state
    }

    pub fn items(&self) -> Vec<Item> {
        self.inner.lock().items.clone()
    }

    pub fn result(&self) -> Option<RerankResult> {
        self.inner.lock().result.clone()
    }

    /// Replaces the held items without calling the backend, e.g. to rerank
    /// a saved result set. Clears the previous rerank result.
    pub fn load_items(&self, items: Vec<Item>) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        if let ActionState::Running(kind) = inner.state {
            return Err(SessionError::Busy(kind));
        }
        warn_on_duplicates(&items);
        inner.items = items;
        inner.result = None;
        Ok(())
    }

    pub async fn parse(&self, query: &str) -> Result<SearchOutcome, SessionError> {
        let query = normalize_query(query)?;
        let _running = self.begin(ActionKind::Parse)?;
        let started = Instant::now();

        let response = self.backend.parse(QueryRequest::new(query.clone())).await?;
        warn_on_duplicates(&response.items);
        {
            let mut inner = self.inner.lock();
            inner.items = response.items.clone();
            inner.result = None;
        }

        let elapsed = started.elapsed();
        info!(
            backend = self.backend.name(),
            items = response.items.len(),
            elapsed_ms = elapsed.as_millis(),
            "parse finished"
        );
        Ok(SearchOutcome {
            action: ActionKind::Parse,
            query,
            items: response.items,
            result: None,
            elapsed,
        })
    }

    /// Reranks the held items.
    pub async fn rerank(&self, query: &str) -> Result<SearchOutcome, SessionError> {
        let query = normalize_query(query)?;
        let _running = self.begin(ActionKind::Rerank)?;
        let items = self.inner.lock().items.clone();
        if items.is_empty() {
            return Err(SessionError::NoItems);
        }
        let started = Instant::now();

        let response = self
            .backend
            .rerank(RerankRequest {
                query: query.clone(),
                items: items.clone(),
            })
            .await?;
        self.inner.lock().result.clone_from(&response.result);

        let elapsed = started.elapsed();
        info!(
            backend = self.backend.name(),
            items = items.len(),
            ranked = response.result.as_ref().map_or(0, |r| r.order().len()),
            elapsed_ms = elapsed.as_millis(),
            "rerank finished"
        );
        Ok(SearchOutcome {
            action: ActionKind::Rerank,
            query,
            items,
            result: response.result,
            elapsed,
        })
    }

    /// Parse and rerank through the combined endpoint.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, SessionError> {
        let query = normalize_query(query)?;
        let _running = self.begin(ActionKind::Combined)?;
        let started = Instant::now();

        let response = self.backend.search(QueryRequest::new(query.clone())).await?;
        warn_on_duplicates(&response.parsed_items);
        {
            let mut inner = self.inner.lock();
            inner.items = response.parsed_items.clone();
            inner.result.clone_from(&response.rerank_result);
        }

        let elapsed = started.elapsed();
        info!(
            backend = self.backend.name(),
            items = response.parsed_items.len(),
            ranked = response
                .rerank_result
                .as_ref()
                .map_or(0, |r| r.order().len()),
            elapsed_ms = elapsed.as_millis(),
            "combined search finished"
        );
        Ok(SearchOutcome {
            action: ActionKind::Combined,
            query,
            items: response.parsed_items,
            result: response.rerank_result,
            elapsed,
        })
    }

    fn begin(&self, kind: ActionKind) -> Result<RunningAction<'_>, SessionError> {
        let mut inner = self.inner.lock();
        if let ActionState::Running(current) = inner.state {
            return Err(SessionError::Busy(current));
        }
        inner.state = ActionState::Running(kind);
        Ok(RunningAction { inner: &self.inner })
    }
}

fn normalize_query(query: &str) -> Result<String, SessionError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SessionError::EmptyQuery);
    }
    Ok(trimmed.to_string())
}

fn warn_on_duplicates(items: &[Item]) {
    if has_duplicate_ids(items) {
        warn!(
            items = items.len(),
            "result set repeats a work_id; reordering keeps the last occurrence"
        );
    }
}
