// src/heuristics/mod.rs

mod rows;

pub use rows::{OrderRowClassifier, ReferenceRowClassifier};

use serde::Deserialize;
use serde::Serialize;

/// A single product line read from an order document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLine {
    pub code: String,
    pub label: String,
    pub quantity: f64,
}

/// A product code with its units-per-box, read from the reference document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitReference {
    pub code: String,
    pub units_per_box: u32,
}

/// A row looked like a product line but is too short to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowShape {
    pub expected: usize,
    pub found: usize,
}

/// Decides whether a raw table row is a product line and reads it.
pub trait RowClassifier {
    type Record;

    /// `Ok(None)` for rows that are not product lines (headers, subtotals,
    /// blank rows). `Err` when a row matches but lacks a required cell.
    fn classify(&self, row: &[String]) -> Result<Option<Self::Record>, RowShape>;
}

/// Cell positions used to read order rows.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLayout {
    #[serde(default = "default_code_column")]
    pub code_column: usize,
    #[serde(default = "default_label_column")]
    pub label_column: usize,
    #[serde(default = "default_quantity_column")]
    pub quantity_column: usize,
    #[serde(default = "default_code_length")]
    pub code_length: usize,
}

/// Cell positions used to read reference rows.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceLayout {
    #[serde(default = "default_code_column")]
    pub code_column: usize,
    #[serde(default = "default_units_column")]
    pub units_column: usize,
}

fn default_code_column() -> usize {
    0
}

fn default_label_column() -> usize {
    1
}

fn default_quantity_column() -> usize {
    6
}

fn default_code_length() -> usize {
    6
}

fn default_units_column() -> usize {
    1
}

impl Default for OrderLayout {
    fn default() -> Self {
        Self {
            code_column: default_code_column(),
            label_column: default_label_column(),
            quantity_column: default_quantity_column(),
            code_length: default_code_length(),
        }
    }
}

impl Default for ReferenceLayout {
    fn default() -> Self {
        Self {
            code_column: default_code_column(),
            units_column: default_units_column(),
        }
    }
}
