use async_trait::async_trait;

use crate::error::ClientError;
use crate::types::{ParseResponse, QueryRequest, RerankRequest, RerankResponse, SearchResponse};

/// The three endpoints a search-and-rerank backend exposes.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// `POST /search/parse`
    async fn parse(&self, request: QueryRequest) -> Result<ParseResponse, ClientError>;

    /// `POST /search/rerank`
    async fn rerank(&self, request: RerankRequest) -> Result<RerankResponse, ClientError>;

    /// `POST /search`, parse and rerank in one round trip.
    async fn search(&self, request: QueryRequest) -> Result<SearchResponse, ClientError>;
}
