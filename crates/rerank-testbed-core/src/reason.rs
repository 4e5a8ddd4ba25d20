use crate::types::RerankResult;

/// Explanation text of a rerank result with surrounding whitespace removed.
/// Empty when there is no result or no reason.
pub fn reason_text(result: Option<&RerankResult>) -> String {
    result
        .and_then(|r| r.reason.as_deref())
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}
