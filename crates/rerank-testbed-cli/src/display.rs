//! Terminal rendering of testbed outcomes.
//!
//! Text mode prints the fetched order next to the reranked order, one row
//! per rank; JSON mode prints a [`Report`] for scripts.

use std::collections::HashMap;
use std::io::{self, Write};

use rerank_testbed_client::{ActionKind, SearchOutcome};
use rerank_testbed_core::{Comparison, Item, RankShift, RerankResult};
use serde::Serialize;

const CELL_WIDTH: usize = 38;
const SYNOPSIS_WIDTH: usize = 72;

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub action: ActionKind,
    pub query: &'a str,
    pub elapsed_ms: u64,
    pub items: &'a [Item],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<&'a RerankResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison<'a>>,
}

impl<'a> Report<'a> {
    pub fn new(outcome: &'a SearchOutcome) -> Self {
        let comparison = match outcome.action {
            ActionKind::Parse => None,
            ActionKind::Rerank | ActionKind::Combined => Some(outcome.comparison()),
        };
        Self {
            action: outcome.action,
            query: &outcome.query,
            elapsed_ms: u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
            items: &outcome.items,
            result: outcome.result.as_ref(),
            comparison,
        }
    }
}

pub fn write_json(out: &mut dyn Write, outcome: &SearchOutcome) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &Report::new(outcome))?;
    writeln!(out)
}

pub fn write_outcome(out: &mut dyn Write, outcome: &SearchOutcome) -> io::Result<()> {
    writeln!(
        out,
        "query: {}  ({}, {} ms)",
        outcome.query,
        outcome.action,
        outcome.elapsed.as_millis()
    )?;
    match outcome.action {
        ActionKind::Parse => write_items(out, &outcome.items),
        ActionKind::Rerank | ActionKind::Combined => write_comparison(out, &outcome.comparison()),
    }
}

pub fn write_items(out: &mut dyn Write, items: &[Item]) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "no items");
    }
    for (pos, item) in items.iter().enumerate() {
        writeln!(out, "{:>3}. {}", pos + 1, item_label(item, usize::MAX))?;
        if !item.work_synopsis.trim().is_empty() {
            writeln!(out, "     {}", truncate(item.work_synopsis.trim(), SYNOPSIS_WIDTH))?;
        }
    }
    writeln!(out, "{} items", items.len())
}

pub fn write_comparison(out: &mut dyn Write, cmp: &Comparison<'_>) -> io::Result<()> {
    let shifts: HashMap<i64, &RankShift> = cmp.shifts.iter().map(|s| (s.work_id, s)).collect();

    writeln!(
        out,
        "{:>3}  {:<width$}  {:<width$}  {}",
        "#",
        "original",
        "reranked",
        "move",
        width = CELL_WIDTH
    )?;
    for row in 0..cmp.rows() {
        let left = cmp
            .original
            .get(row)
            .map(|item| item_label(item, CELL_WIDTH))
            .unwrap_or_default();
        let right_item = cmp.reranked.get(row);
        let right = right_item
            .map(|item| item_label(item, CELL_WIDTH))
            .unwrap_or_default();
        let movement = right_item
            .and_then(|item| shifts.get(&item.work_id))
            .and_then(|shift| shift.movement())
            .map(format_movement)
            .unwrap_or_default();
        writeln!(
            out,
            "{:>3}  {:<width$}  {:<width$}  {}",
            row + 1,
            left,
            right,
            movement,
            width = CELL_WIDTH
        )?;
    }

    if !cmp.is_reranked() {
        writeln!(out, "rerank returned no usable order")?;
    }
    if !cmp.reason.is_empty() {
        writeln!(out, "reason: {}", cmp.reason)?;
    }
    if !cmp.dropped.is_empty() {
        writeln!(out, "dropped by rerank: {}", join_ids(&cmp.dropped))?;
    }
    if !cmp.unknown_ids.is_empty() {
        writeln!(out, "unknown ids in rerank: {}", join_ids(&cmp.unknown_ids))?;
    }
    Ok(())
}

fn item_label(item: &Item, width: usize) -> String {
    let label = if item.work_author.trim().is_empty() {
        format!("[{}] {}", item.work_id, item.work_title.trim())
    } else {
        format!(
            "[{}] {} ({})",
            item.work_id,
            item.work_title.trim(),
            item.work_author.trim()
        )
    };
    truncate(&label, width)
}

fn format_movement(delta: i64) -> String {
    match delta {
        0 => "=".to_string(),
        d if d > 0 => format!("+{d}"),
        d => d.to_string(),
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Cuts `text` to at most `width` characters, marking the cut with `~`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}
