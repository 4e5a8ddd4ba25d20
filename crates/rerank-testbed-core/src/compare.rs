//! Original-versus-reranked view of one result set.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::reason::reason_text;
use crate::reorder::reorder_result;
use crate::types::{Item, RerankResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankShift {
    pub work_id: i64,
    /// 1-based position in the fetched order.
    pub original_rank: usize,
    /// 1-based position after reranking, `None` when the rerank dropped it.
    pub reranked_rank: Option<usize>,
}

impl RankShift {
    /// Positions gained (positive) or lost (negative) by reranking.
    pub fn movement(&self) -> Option<i64> {
        let before = i64::try_from(self.original_rank).ok()?;
        let after = i64::try_from(self.reranked_rank?).ok()?;
        Some(before - after)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison<'a> {
    pub original: Vec<&'a Item>,
    pub reranked: Vec<&'a Item>,
    pub reason: String,
    pub shifts: Vec<RankShift>,
    pub dropped: Vec<i64>,
    pub unknown_ids: Vec<i64>,
}

impl<'a> Comparison<'a> {
    pub fn build(items: &'a [Item], result: Option<&RerankResult>) -> Self {
        let reranked = reorder_result(items, result);
        let order = result.map(RerankResult::order).unwrap_or_default();

        let mut reranked_rank: HashMap<i64, usize> = HashMap::with_capacity(reranked.len());
        for (pos, item) in reranked.iter().enumerate() {
            reranked_rank.entry(item.work_id).or_insert(pos + 1);
        }

        let shifts = items
            .iter()
            .enumerate()
            .map(|(pos, item)| RankShift {
                work_id: item.work_id,
                original_rank: pos + 1,
                reranked_rank: reranked_rank.get(&item.work_id).copied(),
            })
            .collect::<Vec<_>>();

        let dropped = shifts
            .iter()
            .filter(|s| s.reranked_rank.is_none())
            .map(|s| s.work_id)
            .collect();

        let known: HashSet<i64> = items.iter().map(|item| item.work_id).collect();
        let unknown_ids = order
            .iter()
            .copied()
            .filter(|id| !known.contains(id))
            .collect();

        Self {
            original: items.iter().collect(),
            reranked,
            reason: reason_text(result),
            shifts,
            dropped,
            unknown_ids,
        }
    }

    pub fn is_reranked(&self) -> bool {
        !self.reranked.is_empty()
    }

    /// Number of rows a side-by-side rendering needs.
    pub fn rows(&self) -> usize {
        self.original.len().max(self.reranked.len())
    }
}
