//! PDF Core - Low-level AcroForm manipulation
//!
//! This crate provides functionality for:
//! - Opening and saving PDF documents
//! - Copying a template's pages into an independent output document
//! - Enumerating AcroForm fields and their current values
//! - Writing text-field values page by page
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::PdfDocument;
//! use indexmap::IndexMap;
//!
//! let template = PdfDocument::open("template.pdf")?;
//! let mut output = template.copy_document();
//!
//! let mut values = IndexMap::new();
//! values.insert("ma_lop".to_string(), "C01".to_string());
//! for page in output.page_numbers() {
//!     output.update_page_form_field_values(page, &values)?;
//! }
//! output.save("filled.pdf")?;
//! ```

mod document;
mod form;
mod text;

pub use document::PdfDocument;
pub use form::FormField;
pub use text::{decode_text_string, encode_text_string};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(u32, usize),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("Malformed form field: {0}")]
    FieldError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Ordered field name to value mapping
pub type FieldMap = indexmap::IndexMap<String, String>;
