// src/aggregate.rs

use crate::heuristics::ProductLine;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Total ordered quantity of one (code, label) pair across every document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTotal {
    pub code: String,
    pub label: String,
    pub total_quantity: f64,
}

/// Sum quantities per (code, label).
///
/// The same code under two spellings of its label gives two totals. Output is
/// sorted by code then label; input order does not matter.
pub fn aggregate<I>(lines: I) -> Vec<ProductTotal>
where
    I: IntoIterator<Item = ProductLine>,
{
    let mut totals: BTreeMap<(String, String), f64> = BTreeMap::new();
    let mut count = 0usize;

    for line in lines {
        *totals.entry((line.code, line.label)).or_insert(0.0) += line.quantity;
        count += 1;
    }

    debug!(lines = count, products = totals.len(), "Aggregated product lines");

    totals
        .into_iter()
        .map(|((code, label), total_quantity)| ProductTotal {
            code,
            label,
            total_quantity,
        })
        .collect()
}
