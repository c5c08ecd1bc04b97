// src/pipeline.rs

use crate::aggregate::{ProductTotal, aggregate};
use crate::config::Config;
use crate::document::TableDocument;
use crate::error::Result;
use crate::extract::{extract_products, extract_unit_references};
use crate::heuristics::{OrderRowClassifier, ReferenceRowClassifier};
use crate::join::{JoinedRow, join_units};
use crate::pdf_extract::PdfTables;
use crate::xlsx::write_report;
use tracing::{info, warn};

/// Raw bytes of an uploaded document and the name to report it under.
#[derive(Debug, Clone)]
pub struct NamedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl NamedDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// The joined totals and the workbook built from them.
#[derive(Debug, Clone)]
pub struct Report {
    pub rows: Vec<JoinedRow>,
    pub workbook: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// No order document contained a product line; no workbook is produced.
    NothingFound,
    Report(Report),
}

/// Run the whole pipeline over PDF bytes.
///
/// The reference PDF is only parsed once at least one order line exists.
pub fn run(orders: &[NamedDocument], reference: &NamedDocument, config: &Config) -> Result<RunOutcome> {
    let mut order_docs = Vec::with_capacity(orders.len());
    for doc in orders {
        order_docs.push(PdfTables::load(&doc.name, &doc.bytes, &config.table_settings)?);
    }

    let Some(totals) = order_totals(&order_docs, config)? else {
        return Ok(RunOutcome::NothingFound);
    };

    let reference_doc = PdfTables::load(&reference.name, &reference.bytes, &config.table_settings)?;
    build_report(totals, &reference_doc, config).map(RunOutcome::Report)
}

/// Run the pipeline over documents that are already loaded.
///
/// The reference document is only read when at least one order line exists.
pub fn run_tables<O, R>(orders: &[O], reference: &R, config: &Config) -> Result<RunOutcome>
where
    O: TableDocument,
    R: TableDocument + ?Sized,
{
    match order_totals(orders, config)? {
        Some(totals) => build_report(totals, reference, config).map(RunOutcome::Report),
        None => Ok(RunOutcome::NothingFound),
    }
}

/// Extract and sum every order line; `None` when there is none.
fn order_totals<O: TableDocument>(orders: &[O], config: &Config) -> Result<Option<Vec<ProductTotal>>> {
    let classifier = OrderRowClassifier::new(config.order_layout.clone());

    let mut lines = Vec::new();
    for doc in orders {
        let span = tracing::info_span!("order", document = %doc.name());
        let _guard = span.enter();
        lines.extend(extract_products(doc, &classifier)?);
    }

    if lines.is_empty() {
        warn!(documents = orders.len(), "No products found in the order documents");
        return Ok(None);
    }

    let totals = aggregate(lines);
    info!(products = totals.len(), "Totals computed");
    Ok(Some(totals))
}

fn build_report<R>(totals: Vec<ProductTotal>, reference: &R, config: &Config) -> Result<Report>
where
    R: TableDocument + ?Sized,
{
    let references = {
        let span = tracing::info_span!("reference", document = %reference.name());
        let _guard = span.enter();
        let classifier = ReferenceRowClassifier::new(config.reference_layout.clone());
        extract_unit_references(reference, &classifier)?
    };

    let rows = join_units(totals, &references);
    let workbook = write_report(&rows, &config.report)?;

    Ok(Report { rows, workbook })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::error::Error;
    use crate::pdf_extract::{build_cid_test_pdf, build_test_pdf};

    fn order(name: &str, rows: &[&[&str]]) -> MemoryDocument {
        MemoryDocument::single_table(name, rows)
    }

    #[test]
    fn test_two_orders_joined_with_reference() {
        let orders = vec![
            order(
                "a.pdf",
                &[
                    &["Code", "Libellé", "", "", "", "", "Qté"],
                    &["123456", "Widget", "", "", "", "", "2"],
                    &["999999", "Mystery", "", "", "", "", "1,5"],
                ],
            ),
            order("b.pdf", &[&["123456", "Widget", "", "", "", "", "2"]]),
        ];
        let reference = order(
            "units.pdf",
            &[&["Code", "Unités"], &["123456", "12"], &["555555", "6"]],
        );

        let RunOutcome::Report(report) =
            run_tables(&orders, &reference, &Config::default()).unwrap()
        else {
            panic!("expected a report");
        };

        assert_eq!(
            report.rows,
            vec![
                JoinedRow {
                    code: "123456".to_string(),
                    label: "Widget".to_string(),
                    total_quantity: 4.0,
                    units_per_box: Some(12),
                },
                JoinedRow {
                    code: "999999".to_string(),
                    label: "Mystery".to_string(),
                    total_quantity: 1.5,
                    units_per_box: None,
                },
            ]
        );
        assert!(report.workbook.starts_with(b"PK"));
    }

    #[test]
    fn test_no_products_means_no_workbook() {
        let orders = vec![order("a.pdf", &[&["Code", "Libellé"], &["", "Total"]])];
        let reference = order("units.pdf", &[&["123456", "12"]]);
        let outcome = run_tables(&orders, &reference, &Config::default()).unwrap();
        assert!(matches!(outcome, RunOutcome::NothingFound));

        let outcome = run_tables::<MemoryDocument, _>(&[], &reference, &Config::default()).unwrap();
        assert!(matches!(outcome, RunOutcome::NothingFound));
    }

    #[test]
    fn test_malformed_row_aborts_the_run() {
        let orders = vec![
            order("good.pdf", &[&["123456", "Widget", "", "", "", "", "2"]]),
            order("bad.pdf", &[&["654321", "Gadget", "2"]]),
        ];
        let reference = order("units.pdf", &[&["123456", "12"]]);
        let err = run_tables(&orders, &reference, &Config::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { ref document, .. } if document == "bad.pdf"));
    }

    #[test]
    fn test_pdf_bytes_end_to_end() {
        let order_row = |y: i64, code: &'static str, label: &'static str, qty: &'static str| {
            vec![(50, y, code), (110, y, label), (420, y, qty)]
        };
        let mut page = vec![(50, 720, "Code"), (110, 720, "Produit"), (420, 720, "Qte")];
        page.extend(order_row(700, "123456", "Widget", "3,5"));
        page.extend(order_row(680, "234567", "Gadget", "2"));
        let first = build_test_pdf(&[page]);

        let mut page = vec![(50, 720, "Code"), (110, 720, "Produit"), (420, 720, "Qte")];
        page.extend(order_row(700, "123456", "Widget", "0.5"));
        let second = build_test_pdf(&[page]);

        let reference = build_test_pdf(&[vec![
            (50, 720, "Code"),
            (150, 720, "Unites"),
            (50, 700, "123456"),
            (150, 700, "12"),
            (50, 680, "234567"),
            (150, 680, "carton"),
        ]]);

        // these synthetic orders carry three columns: code, label, quantity
        let config = Config::parse("[order_layout]\nquantity_column = 2\n").unwrap();

        let outcome = run(
            &[
                NamedDocument::new("first.pdf", first),
                NamedDocument::new("second.pdf", second),
            ],
            &NamedDocument::new("units.pdf", reference),
            &config,
        )
        .unwrap();

        let RunOutcome::Report(report) = outcome else {
            panic!("expected a report");
        };
        let seen: Vec<(&str, f64, Option<u32>)> = report
            .rows
            .iter()
            .map(|r| (r.code.as_str(), r.total_quantity, r.units_per_box))
            .collect();
        assert_eq!(seen, vec![("123456", 4.0, Some(12)), ("234567", 2.0, Some(1))]);
    }

    #[test]
    fn test_unreadable_pdf_fails_the_run() {
        let err = run(
            &[NamedDocument::new("order.pdf", b"this is not a pdf".to_vec())],
            &NamedDocument::new("units.pdf", Vec::new()),
            &Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Pdf { ref document, .. } if document == "order.pdf"));
    }

    #[test]
    fn test_reference_is_not_parsed_without_order_lines() {
        let order = build_test_pdf(&[vec![(50, 720, "Conditions"), (300, 720, "generales")]]);
        let outcome = run(
            &[NamedDocument::new("order.pdf", order)],
            &NamedDocument::new("units.pdf", b"not a pdf either".to_vec()),
            &Config::default(),
        )
        .unwrap();
        assert!(matches!(outcome, RunOutcome::NothingFound));
    }

    #[test]
    fn test_composite_font_orders_are_counted() {
        let order = build_cid_test_pdf(&[vec![
            (50, 720, "Code"),
            (110, 720, "Produit"),
            (420, 720, "Qte"),
            (50, 700, "123456"),
            (110, 700, "Widget"),
            (420, 700, "3,5"),
        ]]);
        let reference = build_test_pdf(&[vec![(50, 720, "123456"), (150, 720, "6")]]);
        let config = Config::parse("[order_layout]\nquantity_column = 2\n").unwrap();

        let outcome = run(
            &[NamedDocument::new("cid.pdf", order)],
            &NamedDocument::new("units.pdf", reference),
            &config,
        )
        .unwrap();

        let RunOutcome::Report(report) = outcome else {
            panic!("expected a report");
        };
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].label, "Widget");
        assert_eq!(report.rows[0].total_quantity, 3.5);
        assert_eq!(report.rows[0].units_per_box, Some(6));
    }
}
