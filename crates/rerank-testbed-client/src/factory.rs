use std::sync::Arc;

use crate::config::HttpBackendConfig;
use crate::error::ClientError;
use crate::providers::HttpSearchBackend;
use crate::traits::SearchBackend;

pub fn build_search_backend(cfg: HttpBackendConfig) -> Result<Arc<dyn SearchBackend>, ClientError> {
    Ok(Arc::new(HttpSearchBackend::new(cfg)?))
}
