use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One search hit as returned by the parse and combined endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub work_id: i64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub work_title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub work_author: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub work_synopsis: String,
}

impl Item {
    pub fn new(work_id: i64, work_title: impl Into<String>) -> Self {
        Self {
            work_id,
            work_title: work_title.into(),
            work_author: String::new(),
            work_synopsis: String::new(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.work_author = author.into();
        self
    }

    pub fn with_synopsis(mut self, synopsis: impl Into<String>) -> Self {
        self.work_synopsis = synopsis.into();
        self
    }
}

/// Output of a rerank call.
///
/// `reason` and `work_ids` are the fields the testbed understands. Anything
/// else the backend sends lands in `extensions` and is written back out
/// unchanged when the result is serialized.
///
/// Optional fields with the wrong shape decode as absent instead of failing
/// the whole response: a non-string `reason` becomes `None`, a non-array
/// `work_id` becomes `None`, and non-integer entries inside the array are
/// skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RerankResult {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub reason: Option<String>,
    #[serde(
        rename = "work_id",
        default,
        deserialize_with = "lenient_ids",
        skip_serializing_if = "Option::is_none"
    )]
    pub work_ids: Option<Vec<i64>>,
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl RerankResult {
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_work_ids(mut self, ids: impl Into<Vec<i64>>) -> Self {
        self.work_ids = Some(ids.into());
        self
    }

    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    /// Rerank order, empty when the backend sent none.
    pub fn order(&self) -> &[i64] {
        self.work_ids.as_deref().unwrap_or(&[])
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

fn lenient_ids<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(values) => Some(values.iter().filter_map(Value::as_i64).collect()),
        _ => None,
    })
}

/// Decodes an optional rerank result, treating anything that is not a JSON
/// object as absent. Intended for `#[serde(deserialize_with = ...)]` on
/// response envelopes.
pub fn lenient_rerank_result<'de, D>(deserializer: D) -> Result<Option<RerankResult>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}
