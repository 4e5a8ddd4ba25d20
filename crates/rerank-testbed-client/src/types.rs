use std::fmt;
use std::time::Duration;

use rerank_testbed_core::{
    Comparison, Item, RerankResult, lenient_rerank_result, reason_text, reorder_result,
};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    pub query: String,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RerankRequest {
    pub query: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RerankResponse {
    #[serde(default, deserialize_with = "lenient_rerank_result")]
    pub result: Option<RerankResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub parsed_items: Vec<Item>,
    #[serde(default, deserialize_with = "lenient_rerank_result")]
    pub rerank_result: Option<RerankResult>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Item>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Item>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Parse,
    Rerank,
    Combined,
}

impl ActionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Rerank => "rerank",
            Self::Combined => "combined",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one finished testbed action left behind.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub action: ActionKind,
    pub query: String,
    pub items: Vec<Item>,
    pub result: Option<RerankResult>,
    pub elapsed: Duration,
}

impl SearchOutcome {
    pub fn reordered(&self) -> Vec<&Item> {
        reorder_result(&self.items, self.result.as_ref())
    }

    pub fn reason(&self) -> String {
        reason_text(self.result.as_ref())
    }

    pub fn comparison(&self) -> Comparison<'_> {
        Comparison::build(&self.items, self.result.as_ref())
    }
}
