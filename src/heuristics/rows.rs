use super::{OrderLayout, ProductLine, ReferenceLayout, RowClassifier, RowShape, UnitReference};
use crate::quantity::{is_digits, parse_quantity, parse_units};

/// Reads order rows: a fixed-length numeric code, a label and a quantity cell.
#[derive(Debug, Clone, Default)]
pub struct OrderRowClassifier {
    layout: OrderLayout,
}

impl OrderRowClassifier {
    pub fn new(layout: OrderLayout) -> Self {
        Self { layout }
    }

    fn is_product_code(&self, cell: &str) -> bool {
        is_digits(cell) && cell.chars().count() == self.layout.code_length
    }
}

impl RowClassifier for OrderRowClassifier {
    type Record = ProductLine;

    fn classify(&self, row: &[String]) -> Result<Option<ProductLine>, RowShape> {
        let Some(code) = row.get(self.layout.code_column) else {
            return Ok(None);
        };
        if !self.is_product_code(code) {
            return Ok(None);
        }

        let expected = self.layout.label_column.max(self.layout.quantity_column) + 1;
        if row.len() < expected {
            return Err(RowShape {
                expected,
                found: row.len(),
            });
        }

        Ok(Some(ProductLine {
            code: code.clone(),
            label: row[self.layout.label_column].clone(),
            quantity: parse_quantity(Some(&row[self.layout.quantity_column])),
        }))
    }
}

/// Reads reference rows: a numeric code of any length and its units-per-box.
#[derive(Debug, Clone, Default)]
pub struct ReferenceRowClassifier {
    layout: ReferenceLayout,
}

impl ReferenceRowClassifier {
    pub fn new(layout: ReferenceLayout) -> Self {
        Self { layout }
    }
}

impl RowClassifier for ReferenceRowClassifier {
    type Record = UnitReference;

    fn classify(&self, row: &[String]) -> Result<Option<UnitReference>, RowShape> {
        let Some(code) = row.get(self.layout.code_column) else {
            return Ok(None);
        };
        if !is_digits(code) {
            return Ok(None);
        }

        let Some(units) = row.get(self.layout.units_column) else {
            return Err(RowShape {
                expected: self.layout.units_column + 1,
                found: row.len(),
            });
        };

        Ok(Some(UnitReference {
            code: code.clone(),
            units_per_box: parse_units(units),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_order_row_is_read() {
        let classifier = OrderRowClassifier::default();
        let record = classifier
            .classify(&row(&["123456", "Widget", "", "", "", "", "3,5"]))
            .unwrap()
            .unwrap();
        assert_eq!(
            record,
            ProductLine {
                code: "123456".to_string(),
                label: "Widget".to_string(),
                quantity: 3.5,
            }
        );
    }

    #[test]
    fn test_order_row_skips_headers_and_subtotals() {
        let classifier = OrderRowClassifier::default();
        for cells in [
            vec!["Code", "Libellé", "", "", "", "", "Qté"],
            vec!["", "Sous-total", "", "", "", "", "42"],
            vec!["12345", "Too short code", "", "", "", "", "1"],
            vec!["1234567", "Too long code", "", "", "", "", "1"],
            vec!["12345A", "Not numeric", "", "", "", "", "1"],
            vec![],
        ] {
            assert_eq!(classifier.classify(&row(&cells)).unwrap(), None);
        }
    }

    #[test]
    fn test_order_row_with_unreadable_quantity_counts_zero() {
        let classifier = OrderRowClassifier::default();
        let record = classifier
            .classify(&row(&["654321", "Gadget", "", "", "", "", "n/a"]))
            .unwrap()
            .unwrap();
        assert_eq!(record.quantity, 0.0);
    }

    #[test]
    fn test_short_order_row_is_malformed() {
        let classifier = OrderRowClassifier::default();
        let err = classifier
            .classify(&row(&["123456", "Widget", "3"]))
            .unwrap_err();
        assert_eq!(
            err,
            RowShape {
                expected: 7,
                found: 3
            }
        );
    }

    #[test]
    fn test_custom_order_layout() {
        let classifier = OrderRowClassifier::new(OrderLayout {
            code_column: 0,
            label_column: 1,
            quantity_column: 2,
            code_length: 4,
        });
        let record = classifier
            .classify(&row(&["0042", "Bolt", "10"]))
            .unwrap()
            .unwrap();
        assert_eq!(record.code, "0042");
        assert_eq!(record.quantity, 10.0);
    }

    #[test]
    fn test_reference_row_is_read() {
        let classifier = ReferenceRowClassifier::default();
        let record = classifier.classify(&row(&["123456", "12"])).unwrap().unwrap();
        assert_eq!(
            record,
            UnitReference {
                code: "123456".to_string(),
                units_per_box: 12,
            }
        );
    }

    #[test]
    fn test_reference_row_any_code_length_and_default_units() {
        let classifier = ReferenceRowClassifier::default();
        let record = classifier.classify(&row(&["42", "box"])).unwrap().unwrap();
        assert_eq!(record.code, "42");
        assert_eq!(record.units_per_box, 1);

        let record = classifier.classify(&row(&["42", ""])).unwrap().unwrap();
        assert_eq!(record.units_per_box, 1);
    }

    #[test]
    fn test_reference_row_skips_non_numeric_codes() {
        let classifier = ReferenceRowClassifier::default();
        assert_eq!(classifier.classify(&row(&["Code", "Unités"])).unwrap(), None);
        assert_eq!(classifier.classify(&row(&["", "12"])).unwrap(), None);
    }

    #[test]
    fn test_reference_row_without_units_cell_is_malformed() {
        let classifier = ReferenceRowClassifier::default();
        let err = classifier.classify(&row(&["123456"])).unwrap_err();
        assert_eq!(err.expected, 2);
        assert_eq!(err.found, 1);
    }
}
