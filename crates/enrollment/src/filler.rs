//! Form filling and field listing

use crate::mapper::build_field_values;
use crate::parser::parse_record;
use crate::{EnrollmentError, FieldValues, Layout, Result};
use pdf_core::{FieldMap, PdfDocument};
use std::path::{Path, PathBuf};

/// Outcome of a successful fill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillReport {
    /// Where the filled PDF was written
    pub output: PathBuf,
    /// Pages in the filled PDF
    pub pages: usize,
    /// Field updates applied across all pages
    pub fields_updated: usize,
    /// Whether `/NeedAppearances` could be set
    pub need_appearances: bool,
}

/// Fills PDF templates from raw records
pub struct FormFiller {
    layout: Layout,
}

impl Default for FormFiller {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}

impl FormFiller {
    /// Create a filler for a layout
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// Parse a raw record and rename it to PDF field names
    pub fn map_record(&self, raw: &str) -> FieldValues {
        let record = parse_record(raw, &self.layout);
        build_field_values(&record, &self.layout)
    }

    /// Fill a template from a raw record and write the result
    ///
    /// The template is loaded before anything is written, so a template that
    /// cannot be opened leaves no output file behind. An existing output file
    /// is replaced.
    ///
    /// # Arguments
    /// * `raw` - Tab-delimited record
    /// * `template` - Path to the template PDF
    /// * `output` - Path of the filled PDF
    pub fn fill<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        raw: &str,
        template: P,
        output: Q,
    ) -> Result<FillReport> {
        let values = self.map_record(raw);
        let template = PdfDocument::open(template)?;
        let (mut document, mut report) = self.fill_document(&template, &values)?;

        let output = output.as_ref();
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        document.save(output)?;

        report.output = output.to_path_buf();
        log::info!(
            "Filled {} field(s) over {} page(s) into {}",
            report.fields_updated,
            report.pages,
            output.display()
        );
        Ok(report)
    }

    /// Fill a template already in memory and return the filled PDF bytes
    pub fn fill_bytes(&self, raw: &str, template: &[u8]) -> Result<Vec<u8>> {
        let values = self.map_record(raw);
        let template = PdfDocument::open_from_bytes(template)?;
        let (mut document, _) = self.fill_document(&template, &values)?;
        Ok(document.to_bytes()?)
    }

    /// Copy the template's pages and write the values into every page
    ///
    /// The template itself is left untouched. The returned report has an
    /// empty `output` path.
    pub fn fill_document(
        &self,
        template: &PdfDocument,
        values: &FieldValues,
    ) -> Result<(PdfDocument, FillReport)> {
        let mut document = template.copy_document();
        let need_appearances = request_appearance_regeneration(&mut document);

        let mut fields_updated = 0;
        for page in document.page_numbers() {
            fields_updated += document.update_page_form_field_values(page, values.as_map())?;
        }
        if fields_updated == 0 && !values.is_empty() {
            log::warn!("No field of the template matched the layout's field names");
        }

        let report = FillReport {
            output: PathBuf::new(),
            pages: document.page_count(),
            fields_updated,
            need_appearances,
        };
        Ok((document, report))
    }
}

/// Ask viewers to regenerate field appearances
///
/// Best effort: a form dictionary this step cannot handle is logged and
/// skipped, never failing the fill.
fn request_appearance_regeneration(document: &mut PdfDocument) -> bool {
    match document.set_need_appearances() {
        Ok(()) => true,
        Err(err) => {
            log::warn!("Could not set NeedAppearances: {}", err);
            false
        }
    }
}

/// List a template's form fields and their current values
///
/// Fails only when the template cannot be opened.
pub fn list_form_fields<P: AsRef<Path>>(template: P) -> Result<FieldMap> {
    let document = PdfDocument::open(template)?;
    Ok(form_field_values(&document))
}

/// Field names and current values of an open document
///
/// Prefers the text-field listing, falls back to the lenient listing of every
/// field, and degrades to an empty map when both fail.
pub fn form_field_values(document: &PdfDocument) -> FieldMap {
    if !document.has_acroform() {
        log::info!("Template has no AcroForm dictionary");
        return FieldMap::new();
    }

    match document.text_fields() {
        Ok(fields) => return fields,
        Err(err) => log::warn!("Text field listing failed, falling back: {}", err),
    }

    match document.all_fields() {
        Ok(fields) => fields,
        Err(err) => {
            log::warn!("Field listing failed: {}", err);
            FieldMap::new()
        }
    }
}

/// Read a record from a text file, trimming surrounding whitespace
pub fn read_data_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let content =
        std::fs::read_to_string(path).map_err(|source| EnrollmentError::DataFileError {
            path: path.display().to_string(),
            source,
        })?;
    Ok(content.trim().to_string())
}
