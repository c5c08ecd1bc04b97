// src/extract.rs

use crate::document::TableDocument;
use crate::error::{Error, Result};
use crate::heuristics::{
    OrderRowClassifier, ProductLine, ReferenceRowClassifier, RowClassifier, UnitReference,
};
use tracing::{debug, info};

/// Walk every row of every table of every page, in order, and keep the rows
/// the classifier accepts.
///
/// A document without tables or without matching rows yields an empty list.
/// A row that matches but is too short aborts the whole extraction.
pub fn extract_records<D, C>(doc: &D, classifier: &C) -> Result<Vec<C::Record>>
where
    D: TableDocument + ?Sized,
    C: RowClassifier,
{
    let mut records = Vec::new();

    for page in 0..doc.page_count() {
        let tables = doc.page_tables(page)?;
        for (t, table) in tables.iter().enumerate() {
            for (r, row) in table.iter().enumerate() {
                match classifier.classify(row) {
                    Ok(Some(record)) => records.push(record),
                    Ok(None) => {}
                    Err(shape) => {
                        return Err(Error::MalformedRow {
                            document: doc.name().to_string(),
                            page: page + 1,
                            table: t + 1,
                            row: r + 1,
                            expected: shape.expected,
                            found: shape.found,
                        });
                    }
                }
            }
        }
        debug!(page = page + 1, tables = tables.len(), records = records.len(), "Page scanned");
    }

    Ok(records)
}

/// Product lines of one order document.
pub fn extract_products<D>(doc: &D, classifier: &OrderRowClassifier) -> Result<Vec<ProductLine>>
where
    D: TableDocument + ?Sized,
{
    let products = extract_records(doc, classifier)?;
    info!(document = %doc.name(), products = products.len(), "Order document extracted");
    Ok(products)
}

/// Units-per-box entries of the reference document, in document order.
pub fn extract_unit_references<D>(
    doc: &D,
    classifier: &ReferenceRowClassifier,
) -> Result<Vec<UnitReference>>
where
    D: TableDocument + ?Sized,
{
    let references = extract_records(doc, classifier)?;
    info!(document = %doc.name(), references = references.len(), "Reference document extracted");
    Ok(references)
}
