// src/join.rs

use crate::aggregate::ProductTotal;
use crate::heuristics::UnitReference;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// A product total with its units-per-box, when the reference knows the code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedRow {
    pub code: String,
    pub label: String,
    pub total_quantity: f64,
    pub units_per_box: Option<u32>,
}

impl JoinedRow {
    /// Boxes needed, for display. The workbook computes its own with a formula.
    pub fn box_count(&self) -> Option<f64> {
        self.units_per_box
            .map(|units| self.total_quantity / f64::from(units))
    }
}

/// Left join of totals with the reference entries on product code.
///
/// Every total appears exactly once, in input order. Reference codes with no
/// order activity are dropped. When the reference lists a code more than
/// once the last entry wins.
pub fn join_units(totals: Vec<ProductTotal>, references: &[UnitReference]) -> Vec<JoinedRow> {
    let mut units: HashMap<&str, u32> = HashMap::with_capacity(references.len());
    for reference in references {
        if let Some(previous) = units.insert(&reference.code, reference.units_per_box) {
            debug!(
                code = %reference.code,
                previous,
                current = reference.units_per_box,
                "Duplicate reference code, keeping the last one"
            );
        }
    }

    let rows: Vec<JoinedRow> = totals
        .into_iter()
        .map(|total| JoinedRow {
            units_per_box: units.get(total.code.as_str()).copied(),
            code: total.code,
            label: total.label,
            total_quantity: total.total_quantity,
        })
        .collect();

    let unmatched = rows.iter().filter(|r| r.units_per_box.is_none()).count();
    info!(rows = rows.len(), unmatched, "Joined totals with units per box");
    rows
}
