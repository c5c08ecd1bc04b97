//! Purchase-order totals: read product lines out of order PDFs, add them up per
//! product, attach units-per-box from a reference PDF and write a workbook whose
//! box-count column is a live formula.

pub mod aggregate;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod heuristics;
pub mod join;
pub mod layout;
pub mod pdf_extract;
pub mod pipeline;
pub mod quantity;
pub mod xlsx;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{NamedDocument, Report, RunOutcome, run};
