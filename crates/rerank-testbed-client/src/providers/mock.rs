//! In-memory backend with canned answers, for tests and offline demos.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rerank_testbed_core::{Item, RerankResult};

use crate::error::ClientError;
use crate::traits::SearchBackend;
use crate::types::{
    ActionKind, ParseResponse, QueryRequest, RerankRequest, RerankResponse, SearchResponse,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub action: ActionKind,
    pub query: String,
    pub item_count: usize,
}

#[derive(Debug, Default)]
struct MockState {
    items: Vec<Item>,
    result: Option<RerankResult>,
    failure: Option<(u16, String)>,
    delay: Option<Duration>,
    calls: Vec<MockCall>,
}

/// Answers every parse with the configured items and every rerank with the
/// configured result. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockSearchBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockSearchBackend {
    pub fn new(items: Vec<Item>, result: Option<RerankResult>) -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state.lock();
            state.items = items;
            state.result = result;
        }
        backend
    }

    /// Makes every following call fail with the given status.
    pub fn fail_with(&self, status: u16, body: impl Into<String>) {
        self.state.lock().failure = Some((status, body.into()));
    }

    pub fn recover(&self) {
        self.state.lock().failure = None;
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().delay = Some(delay);
    }

    pub fn set_result(&self, result: Option<RerankResult>) {
        self.state.lock().result = result;
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    async fn enter(
        &self,
        action: ActionKind,
        query: &str,
        item_count: usize,
    ) -> Result<(Vec<Item>, Option<RerankResult>), ClientError> {
        let delay = {
            let mut state = self.state.lock();
            state.calls.push(MockCall {
                action,
                query: query.to_string(),
                item_count,
            });
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock();
        if let Some((status, body)) = &state.failure {
            return Err(ClientError::Api {
                status: *status,
                body: body.clone(),
            });
        }
        Ok((state.items.clone(), state.result.clone()))
    }
}

#[async_trait::async_trait]
impl SearchBackend for MockSearchBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn parse(&self, request: QueryRequest) -> Result<ParseResponse, ClientError> {
        let (items, _) = self.enter(ActionKind::Parse, &request.query, 0).await?;
        Ok(ParseResponse { items })
    }

    async fn rerank(&self, request: RerankRequest) -> Result<RerankResponse, ClientError> {
        let (_, result) = self
            .enter(ActionKind::Rerank, &request.query, request.items.len())
            .await?;
        Ok(RerankResponse { result })
    }

    async fn search(&self, request: QueryRequest) -> Result<SearchResponse, ClientError> {
        let (items, result) = self.enter(ActionKind::Combined, &request.query, 0).await?;
        Ok(SearchResponse {
            parsed_items: items,
            rerank_result: result,
        })
    }
}
