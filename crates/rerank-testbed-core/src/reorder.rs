use std::collections::{HashMap, HashSet};

use crate::types::{Item, RerankResult};

/// Maps a rerank id order back onto fetched items.
///
/// Returns the items named by `ids`, in `ids` order. Ids with no matching
/// item are skipped and items not named in `ids` are left out, so the
/// output is a reordered subset rather than a full permutation.
///
/// `work_id` is expected to be unique within `items`. When it is not, the
/// last item carrying a given id is the one returned.
pub fn reorder<'a>(items: &'a [Item], ids: &[i64]) -> Vec<&'a Item> {
    if items.is_empty() || ids.is_empty() {
        return Vec::new();
    }

    let by_id: HashMap<i64, &Item> = items.iter().map(|item| (item.work_id, item)).collect();
    ids.iter().filter_map(|id| by_id.get(id).copied()).collect()
}

/// [`reorder`] driven by a rerank result. An absent result, or one without
/// an id order, yields nothing.
pub fn reorder_result<'a>(items: &'a [Item], result: Option<&RerankResult>) -> Vec<&'a Item> {
    match result {
        Some(result) => reorder(items, result.order()),
        None => Vec::new(),
    }
}

pub fn has_duplicate_ids(items: &[Item]) -> bool {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().any(|item| !seen.insert(item.work_id))
}
