// src/xlsx.rs

//! Minimal SpreadsheetML writer.
//!
//! Writes a single-sheet `.xlsx` package by hand. Cells are either literal
//! strings, literal numbers or formulas; formulas are stored without a
//! cached value and the workbook asks the application to recalculate on
//! load, so the box-count column always reflects the cells it points at.

use crate::error::{Error, Result};
use crate::join::JoinedRow;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use tracing::info;
use zip::write::{SimpleFileOptions, ZipWriter};

const CODE_COLUMN: u16 = 0;
const LABEL_COLUMN: u16 = 1;
const QUANTITY_COLUMN: u16 = 2;
const UNITS_COLUMN: u16 = 3;
const BOX_COUNT_COLUMN: u16 = 4;

const MAX_SHEET_NAME_CHARS: usize = 31;

/// Sheet name and column headers of the totals workbook.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default = "default_file_name")]
    pub file_name: String,
    #[serde(default = "default_code_header")]
    pub code_header: String,
    #[serde(default = "default_label_header")]
    pub label_header: String,
    #[serde(default = "default_quantity_header")]
    pub quantity_header: String,
    #[serde(default = "default_units_header")]
    pub units_header: String,
    #[serde(default = "default_box_count_header")]
    pub box_count_header: String,
}

fn default_sheet_name() -> String {
    "Totaux Produits".to_string()
}

fn default_file_name() -> String {
    "totaux_commandes_boites.xlsx".to_string()
}

fn default_code_header() -> String {
    "Code Article".to_string()
}

fn default_label_header() -> String {
    "Libellé Produit".to_string()
}

fn default_quantity_header() -> String {
    "Quantité Commandée (UC)".to_string()
}

fn default_units_header() -> String {
    "Unités par Boîte".to_string()
}

fn default_box_count_header() -> String {
    "Nombre de Boîtes".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
            file_name: default_file_name(),
            code_header: default_code_header(),
            label_header: default_label_header(),
            quantity_header: default_quantity_header(),
            units_header: default_units_header(),
            box_count_header: default_box_count_header(),
        }
    }
}

/// Write the joined totals as a workbook whose last column divides the
/// quantity cell by the units cell of the same row.
pub fn write_report(rows: &[JoinedRow], config: &ReportConfig) -> Result<Vec<u8>> {
    let mut sheet = Worksheet::new(&config.sheet_name)?;

    let headers = [
        &config.code_header,
        &config.label_header,
        &config.quantity_header,
        &config.units_header,
        &config.box_count_header,
    ];
    for (col, header) in (0u16..).zip(headers) {
        sheet.write_string(0, col, header);
    }

    for (row, item) in (1u32..).zip(rows) {
        sheet.write_string(row, CODE_COLUMN, &item.code);
        sheet.write_string(row, LABEL_COLUMN, &item.label);
        sheet.write_number(row, QUANTITY_COLUMN, item.total_quantity);
        if let Some(units) = item.units_per_box {
            sheet.write_number(row, UNITS_COLUMN, f64::from(units));
        }
        let formula = format!(
            "{}/{}",
            cell_ref(row, QUANTITY_COLUMN),
            cell_ref(row, UNITS_COLUMN)
        );
        sheet.write_formula(row, BOX_COUNT_COLUMN, &formula);
    }

    let bytes = Workbook::new(sheet).save_to_buffer()?;
    info!(rows = rows.len(), bytes = bytes.len(), "Workbook written");
    Ok(bytes)
}

/// Column letters for a 0-based column index: 0 is `A`, 26 is `AA`.
pub fn column_name(col: u16) -> String {
    let mut n = u32::from(col) + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A1-style reference for a 0-based (row, col).
pub fn cell_ref(row: u32, col: u16) -> String {
    format!("{}{}", column_name(col), row + 1)
}

#[derive(Debug, Clone, PartialEq)]
enum CellValue {
    String(String),
    Number(f64),
    Formula(String),
}

/// One sheet of cells addressed by 0-based (row, col).
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    cells: BTreeMap<(u32, u16), CellValue>,
}

impl Worksheet {
    pub fn new(name: &str) -> Result<Self> {
        validate_sheet_name(name)?;
        Ok(Self {
            name: name.to_string(),
            cells: BTreeMap::new(),
        })
    }

    pub fn write_string(&mut self, row: u32, col: u16, value: &str) {
        self.cells
            .insert((row, col), CellValue::String(value.to_string()));
    }

    pub fn write_number(&mut self, row: u32, col: u16, value: f64) {
        self.cells.insert((row, col), CellValue::Number(value));
    }

    /// Store a formula such as `C2/D2`; a leading `=` is accepted and dropped.
    pub fn write_formula(&mut self, row: u32, col: u16, formula: &str) {
        let formula = formula.strip_prefix('=').unwrap_or(formula);
        self.cells
            .insert((row, col), CellValue::Formula(formula.to_string()));
    }

    fn dimension(&self) -> String {
        let Some(&(last_row, _)) = self.cells.keys().next_back() else {
            return "A1".to_string();
        };
        let first_row = self.cells.keys().next().map_or(0, |(r, _)| *r);
        let first_col = self.cells.keys().map(|(_, c)| *c).min().unwrap_or(0);
        let last_col = self.cells.keys().map(|(_, c)| *c).max().unwrap_or(0);
        format!(
            "{}:{}",
            cell_ref(first_row, first_col),
            cell_ref(last_row, last_col)
        )
    }

    fn to_xml(&self, strings: &mut SharedStrings) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );
        let _ = write!(xml, r#"<dimension ref="{}"/><sheetData>"#, self.dimension());

        let mut open_row: Option<u32> = None;
        for (&(row, col), value) in &self.cells {
            if open_row != Some(row) {
                if open_row.is_some() {
                    xml.push_str("</row>");
                }
                let _ = write!(xml, r#"<row r="{}">"#, row + 1);
                open_row = Some(row);
            }

            let r = cell_ref(row, col);
            let _ = match value {
                CellValue::String(s) => {
                    write!(xml, r#"<c r="{}" t="s"><v>{}</v></c>"#, r, strings.index(s))
                }
                CellValue::Number(n) => write!(xml, r#"<c r="{}"><v>{}</v></c>"#, r, n),
                CellValue::Formula(f) => {
                    write!(xml, r#"<c r="{}"><f>{}</f></c>"#, r, escape_xml(f))
                }
            };
        }
        if open_row.is_some() {
            xml.push_str("</row>");
        }

        xml.push_str("</sheetData></worksheet>");
        xml
    }
}

fn validate_sheet_name(name: &str) -> Result<()> {
    let len = name.chars().count();
    if len == 0 || len > MAX_SHEET_NAME_CHARS {
        return Err(Error::Config(format!(
            "sheet name '{name}' must be 1 to {MAX_SHEET_NAME_CHARS} characters"
        )));
    }
    if let Some(bad) = name.chars().find(|c| "[]:*?/\\".contains(*c)) {
        return Err(Error::Config(format!(
            "sheet name '{name}' contains forbidden character '{bad}'"
        )));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(Error::Config(format!(
            "sheet name '{name}' cannot start or end with an apostrophe"
        )));
    }
    Ok(())
}

#[derive(Debug, Default)]
struct SharedStrings {
    strings: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl SharedStrings {
    fn index(&mut self, s: &str) -> usize {
        if let Some(&i) = self.lookup.get(s) {
            return i;
        }
        let i = self.strings.len();
        self.strings.push(s.to_string());
        self.lookup.insert(s.to_string(), i);
        i
    }

    fn to_xml(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        let _ = write!(
            xml,
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
            self.strings.len()
        );
        for s in &self.strings {
            let _ = write!(xml, r#"<si><t xml:space="preserve">{}</t></si>"#, escape_xml(s));
        }
        xml.push_str("</sst>");
        xml
    }
}

/// Escape markup characters and drop control characters XML 1.0 cannot hold.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// A single-sheet workbook package.
pub struct Workbook {
    sheet: Worksheet,
}

impl Workbook {
    pub fn new(sheet: Worksheet) -> Self {
        Self { sheet }
    }

    fn workbook_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets><calcPr calcId="191029" fullCalcOnLoad="1"/></workbook>"#,
            escape_xml(&self.sheet.name)
        )
    }

    /// Serialize the package to `.xlsx` bytes.
    pub fn save_to_buffer(&self) -> Result<Vec<u8>> {
        let mut strings = SharedStrings::default();
        let sheet_xml = self.sheet.to_xml(&mut strings);

        let parts: [(&str, String); 7] = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", ROOT_RELS.to_string()),
            ("xl/workbook.xml", self.workbook_xml()),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
            ("xl/worksheets/sheet1.xml", sheet_xml),
            ("xl/sharedStrings.xml", strings.to_xml()),
            ("xl/styles.xml", STYLES.to_string()),
        ];

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (path, content) in &parts {
            zip.start_file(*path, options)?;
            zip.write_all(content.as_bytes())?;
        }
        Ok(zip.finish()?.into_inner())
    }
}
