// src/layout.rs

//! Text-layout table detection.
//!
//! Turns positioned text fragments of one page into tables. Fragments sharing
//! a baseline form a line; neighbouring fragments on a line form a cell; runs
//! of multi-cell lines form a table. Column boundaries are the union of
//! overlapping cell spans across all rows of a table, so a column keeps its
//! position even on rows where it is empty.

use crate::document::{Row, Table};
use serde::Deserialize;

/// A run of text placed on the page, in PDF user space (y grows upwards).
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub x: f32,
    pub y: f32,
    /// Advance of the whole run.
    pub width: f32,
    pub size: f32,
    pub text: String,
}

/// Tolerances for table detection, in PDF points.
#[derive(Debug, Clone, Deserialize)]
pub struct TableSettings {
    /// Fragments whose baselines differ by at most this much share a line.
    #[serde(default = "default_line_tolerance")]
    pub line_tolerance: f32,
    /// Fragments closer than this on a line are one cell.
    #[serde(default = "default_cell_gap")]
    pub cell_gap: f32,
    /// Larger vertical gaps between lines start a new table.
    #[serde(default = "default_max_row_gap")]
    pub max_row_gap: f32,
    /// Lines with fewer cells end the current table.
    #[serde(default = "default_min_columns")]
    pub min_columns: usize,
}

fn default_line_tolerance() -> f32 {
    2.0
}

fn default_cell_gap() -> f32 {
    4.0
}

fn default_max_row_gap() -> f32 {
    40.0
}

fn default_min_columns() -> usize {
    2
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            line_tolerance: default_line_tolerance(),
            cell_gap: default_cell_gap(),
            max_row_gap: default_max_row_gap(),
            min_columns: default_min_columns(),
        }
    }
}

#[derive(Debug, Clone)]
struct Cell {
    x0: f32,
    x1: f32,
    text: String,
}

#[derive(Debug)]
struct Line {
    y: f32,
    cells: Vec<Cell>,
}

/// Segment one page's fragments into tables, top to bottom.
pub fn segment_tables(mut fragments: Vec<TextFragment>, settings: &TableSettings) -> Vec<Table> {
    fragments.retain(|f| !f.text.trim().is_empty());
    fragments.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let lines = group_lines(fragments, settings);

    let mut tables = Vec::new();
    let mut block: Vec<Line> = Vec::new();
    for line in lines {
        let fits = line.cells.len() >= settings.min_columns;
        let close = block
            .last()
            .is_none_or(|prev| prev.y - line.y <= settings.max_row_gap);

        if !(fits && close) && !block.is_empty() {
            tables.push(build_table(std::mem::take(&mut block)));
        }
        if fits {
            block.push(line);
        }
    }
    if !block.is_empty() {
        tables.push(build_table(block));
    }

    tables
}

fn group_lines(fragments: Vec<TextFragment>, settings: &TableSettings) -> Vec<Line> {
    let mut grouped: Vec<(f32, Vec<TextFragment>)> = Vec::new();
    for frag in fragments {
        match grouped.last_mut() {
            Some((y, members)) if (*y - frag.y).abs() <= settings.line_tolerance => {
                members.push(frag)
            }
            _ => grouped.push((frag.y, vec![frag])),
        }
    }

    grouped
        .into_iter()
        .map(|(y, mut members)| {
            members.sort_by(|a, b| a.x.total_cmp(&b.x));
            Line {
                y,
                cells: merge_cells(members, settings.cell_gap),
            }
        })
        .collect()
}

fn merge_cells(members: Vec<TextFragment>, cell_gap: f32) -> Vec<Cell> {
    let mut cells: Vec<Cell> = Vec::new();
    for frag in members {
        let text = frag.text.trim();
        match cells.last_mut() {
            Some(cell) if frag.x - cell.x1 <= cell_gap => {
                // glyph runs split inside a word sit flush against each other
                if frag.x - cell.x1 > frag.size * 0.15 {
                    cell.text.push(' ');
                }
                cell.text.push_str(text);
                cell.x1 = cell.x1.max(frag.x + frag.width);
            }
            _ => cells.push(Cell {
                x0: frag.x,
                x1: frag.x + frag.width,
                text: text.to_string(),
            }),
        }
    }
    cells
}

fn build_table(lines: Vec<Line>) -> Table {
    let mut spans: Vec<(f32, f32)> = lines
        .iter()
        .flat_map(|l| l.cells.iter().map(|c| (c.x0, c.x1)))
        .collect();
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut columns: Vec<(f32, f32)> = Vec::new();
    for (x0, x1) in spans {
        match columns.last_mut() {
            Some(col) if x0 < col.1 => col.1 = col.1.max(x1),
            _ => columns.push((x0, x1)),
        }
    }

    lines
        .into_iter()
        .map(|line| {
            let mut row: Row = vec![String::new(); columns.len()];
            for cell in line.cells {
                let idx = columns
                    .iter()
                    .rposition(|(x0, _)| *x0 <= cell.x0)
                    .unwrap_or(0);
                if !row[idx].is_empty() {
                    row[idx].push(' ');
                }
                row[idx].push_str(&cell.text);
            }
            row
        })
        .collect()
}
