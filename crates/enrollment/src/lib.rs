//! Enrollment - tab-delimited records into AcroForm templates
//!
//! This crate provides:
//! - The layout tables: record column indices and form field renames
//! - Record parsing from a tab-delimited line
//! - Mapping of parsed values onto PDF field names
//! - Filling and inspecting PDF templates through `pdf-core`
//!
//! # Example
//!
//! ```ignore
//! use enrollment::{list_form_fields, FormFiller, Layout};
//!
//! let filler = FormFiller::new(Layout::default());
//! filler.fill("C01\t\t\tHV1\tNguyen Van A", "template.pdf", "filled.pdf")?;
//!
//! for (name, value) in list_form_fields("filled.pdf")? {
//!     println!("{name}\t{value}");
//! }
//! ```

mod filler;
pub mod layout;
pub mod mapper;
pub mod parser;

pub use filler::{form_field_values, list_form_fields, read_data_file, FillReport, FormFiller};
pub use layout::{ColumnDef, FieldDef, Layout};
pub use mapper::{build_field_values, FieldValues};
pub use parser::{parse_record, ParsedRecord, FIELD_DELIMITER};

use thiserror::Error;

/// Errors that can occur while parsing, mapping or filling
#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("Invalid layout: {0}")]
    LayoutError(String),

    #[error("Failed to read data file {path}: {source}")]
    DataFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for enrollment operations
pub type Result<T> = std::result::Result<T, EnrollmentError>;
