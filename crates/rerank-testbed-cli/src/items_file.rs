use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rerank_testbed_core::Item;
use serde_json::Value;

/// Accepts a bare item array, a saved parse response (`{"items": [...]}`)
/// or a saved combined response (`{"parsed_items": [...]}`).
pub fn parse_items(raw: &str) -> Result<Vec<Item>> {
    let value: Value = serde_json::from_str(raw).context("items file is not valid JSON")?;
    let (field, list) = match value {
        Value::Array(_) => ("item array", value),
        Value::Object(mut map) => {
            if let Some(list) = map.remove("items") {
                ("items", list)
            } else if let Some(list) = map.remove("parsed_items") {
                ("parsed_items", list)
            } else {
                bail!("expected an item array, {{\"items\": [...]}} or {{\"parsed_items\": [...]}}");
            }
        }
        _ => bail!("expected an item array, {{\"items\": [...]}} or {{\"parsed_items\": [...]}}"),
    };
    serde_json::from_value(list).with_context(|| format!("invalid {field}"))
}

pub fn read_items_file(path: &Path) -> Result<Vec<Item>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read items file {}", path.display()))?;
    parse_items(&raw).with_context(|| format!("invalid items file {}", path.display()))
}
