use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::HttpBackendConfig;
use crate::error::ClientError;
use crate::traits::SearchBackend;
use crate::types::{ParseResponse, QueryRequest, RerankRequest, RerankResponse, SearchResponse};

const PARSE_PATH: &str = "/search/parse";
const RERANK_PATH: &str = "/search/rerank";
const SEARCH_PATH: &str = "/search";

#[derive(Clone)]
pub struct HttpSearchBackend {
    base_url: String,
    client: Client,
}

impl HttpSearchBackend {
    pub fn new(config: HttpBackendConfig) -> Result<Self, ClientError> {
        let base_url = validate_base_url(&config.api_base)?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(url = %url, "posting to search backend");

        let res = self.client.post(&url).json(body).send().await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            warn!(url = %url, status, "search backend returned an error status");
            return Err(ClientError::Api { status, body });
        }

        let bytes = res.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait::async_trait]
impl SearchBackend for HttpSearchBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn parse(&self, request: QueryRequest) -> Result<ParseResponse, ClientError> {
        self.post_json(PARSE_PATH, &request).await
    }

    async fn rerank(&self, request: RerankRequest) -> Result<RerankResponse, ClientError> {
        self.post_json(RERANK_PATH, &request).await
    }

    async fn search(&self, request: QueryRequest) -> Result<SearchResponse, ClientError> {
        self.post_json(SEARCH_PATH, &request).await
    }
}

fn validate_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match host {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(trimmed.to_string()),
        Some(_) => Err(ClientError::Config(format!("api base has no host: {raw:?}"))),
        None => Err(ClientError::Config(format!(
            "api base must start with http:// or https://: {raw:?}"
        ))),
    }
}
