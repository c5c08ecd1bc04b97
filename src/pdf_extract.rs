// src/pdf_extract.rs

use crate::document::{Table, TableDocument};
use crate::error::{Error, Result};
use crate::layout::{self, TableSettings, TextFragment};
use pdf_extract::{Document, MediaBox, OutputDev, OutputError, Transform};
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, info, warn};

/// Glyphs closer than this fraction of the font size continue the same run.
const RUN_JOIN: f32 = 0.1;

/// A PDF document exposed page by page as segmented tables.
///
/// Glyphs are decoded by `pdf-extract` (simple, composite and Type3 fonts,
/// `ToUnicode` maps, form XObjects) once at load time; each page keeps its
/// positioned text runs until its tables are asked for.
pub struct PdfTables {
    name: String,
    pages: Vec<Vec<TextFragment>>,
    settings: TableSettings,
}

impl PdfTables {
    /// Parse raw PDF bytes. Fails when the bytes are not a readable PDF or
    /// when the text of a page cannot be interpreted.
    pub fn load(name: &str, pdf_bytes: &[u8], settings: &TableSettings) -> Result<Self> {
        let doc = Document::load_mem(pdf_bytes)
            .map_err(|e| Error::pdf(name, format!("failed to parse PDF: {e}")))?;

        let mut collector = FragmentCollector::default();
        match catch_unwind(AssertUnwindSafe(|| pdf_extract::output_doc(&doc, &mut collector))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(Error::pdf(name, format!("text extraction failed: {e}"))),
            Err(_) => return Err(Error::pdf(name, "text extraction aborted on a malformed page")),
        }
        let pages = collector.finish();

        let runs: usize = pages.iter().map(Vec::len).sum();
        if !pages.is_empty() && runs == 0 {
            warn!(document = %name, pages = pages.len(), "No text layer; the PDF may be scanned");
        }
        info!(document = %name, pages = pages.len(), runs, "PDF loaded");

        Ok(Self {
            name: name.to_string(),
            pages,
            settings: settings.clone(),
        })
    }
}

impl TableDocument for PdfTables {
    fn name(&self) -> &str {
        &self.name
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_tables(&self, index: usize) -> Result<Vec<Table>> {
        let Some(fragments) = self.pages.get(index) else {
            return Ok(Vec::new());
        };
        let tables = layout::segment_tables(fragments.clone(), &self.settings);
        debug!(page = index + 1, fragments = fragments.len(), tables = tables.len(), "Page segmented");
        Ok(tables)
    }
}

/// Receives decoded glyphs and glues neighbours on one baseline into runs.
/// Whitespace glyphs end a run; the layout pass decides whether the gap they
/// leave is a word space or a column break.
#[derive(Default)]
struct FragmentCollector {
    pages: Vec<Vec<TextFragment>>,
    run: Option<TextFragment>,
}

impl FragmentCollector {
    fn flush(&mut self) {
        if let (Some(run), Some(page)) = (self.run.take(), self.pages.last_mut()) {
            page.push(run);
        }
    }

    fn finish(mut self) -> Vec<Vec<TextFragment>> {
        self.flush();
        self.pages
    }
}

fn continues(run: &TextFragment, x: f32, y: f32) -> bool {
    let slack = run.size * RUN_JOIN;
    (run.y - y).abs() <= slack && (x - (run.x + run.width)).abs() <= slack
}

impl OutputDev for FragmentCollector {
    fn begin_page(
        &mut self,
        _page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.flush();
        self.pages.push(Vec::new());
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.flush();
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        spacing: f64,
        font_size: f64,
        text: &str,
    ) -> std::result::Result<(), OutputError> {
        if text.chars().all(|c| c.is_whitespace() || c.is_control()) {
            self.flush();
            return Ok(());
        }

        // trm carries position and scale; font size and glyph advance come separately
        let x = trm.m31 as f32;
        let y = trm.m32 as f32;
        let size = (font_size * trm.m21.hypot(trm.m22)) as f32;
        let advance = ((width * font_size + spacing) * trm.m11.hypot(trm.m12)) as f32;

        match self.run.as_mut() {
            Some(run) if continues(run, x, y) => {
                run.text.push_str(text);
                run.width = x + advance - run.x;
            }
            _ => {
                self.flush();
                self.run = Some(TextFragment {
                    x,
                    y,
                    width: advance,
                    size,
                    text: text.to_string(),
                });
            }
        }
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        self.flush();
        Ok(())
    }
}


#[cfg(test)]
pub(crate) use test_pdf::{build_cid_test_pdf, build_test_pdf};
