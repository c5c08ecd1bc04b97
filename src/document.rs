// src/document.rs

use crate::error::Result;

/// One table row, one string per cell. Empty cells are empty strings.
pub type Row = Vec<String>;

/// Rows of a single table, in reading order.
pub type Table = Vec<Row>;

/// A paginated document seen as pages of already-segmented tables.
///
/// The extractor only ever walks pages, tables, rows and cells through this
/// trait, so the PDF backend can be replaced without touching classification.
pub trait TableDocument {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    fn page_count(&self) -> usize;

    /// Tables on the page at `index` (0-based), top to bottom.
    fn page_tables(&self, index: usize) -> Result<Vec<Table>>;
}

/// A document whose tables are already in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    name: String,
    pages: Vec<Vec<Table>>,
}

impl MemoryDocument {
    pub fn new(name: impl Into<String>, pages: Vec<Vec<Table>>) -> Self {
        Self {
            name: name.into(),
            pages,
        }
    }

    /// Convenience constructor for a single page holding a single table.
    pub fn single_table(name: impl Into<String>, rows: &[&[&str]]) -> Self {
        let table = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        Self::new(name, vec![vec![table]])
    }
}

impl TableDocument for MemoryDocument {
    fn name(&self) -> &str {
        &self.name
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_tables(&self, index: usize) -> Result<Vec<Table>> {
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }
}
