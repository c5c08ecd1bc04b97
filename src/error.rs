// src/error.rs

//! Error types for the order totals pipeline.
//!
//! Local classification problems (unreadable quantities, odd unit cells) never
//! reach this type; they are absorbed where they occur. What remains here are
//! structural failures that abort a run.

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A document could not be parsed as a PDF or one of its pages could not be read.
    #[error("failed to read document '{document}': {reason}")]
    Pdf { document: String, reason: String },

    /// A row matched a product predicate but is too short for the expected layout.
    #[error(
        "malformed row in '{document}' (page {page}, table {table}, row {row}): \
         expected at least {expected} cells, found {found}"
    )]
    MalformedRow {
        document: String,
        page: usize,
        table: usize,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Configuration could not be read or holds an unusable value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Building the workbook archive failed.
    #[error("workbook archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn pdf(document: &str, reason: impl std::fmt::Display) -> Self {
        Error::Pdf {
            document: document.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
