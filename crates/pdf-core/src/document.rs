//! PDF Document wrapper

use crate::{PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;

/// PDF Document wrapper providing high-level form operations
#[derive(Debug, Clone)]
pub struct PdfDocument {
    /// The underlying lopdf document
    pub(crate) inner: Document,
}

impl PdfDocument {
    /// Open a PDF document from a file path
    ///
    /// # Arguments
    /// * `path` - Path to the PDF file
    ///
    /// # Example
    /// ```ignore
    /// let doc = PdfDocument::open("template.pdf")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let inner = Document::load(path)
            .map_err(|e| PdfError::OpenError(format!("{}: {}", path.display(), e)))?;
        log::debug!(
            "Loaded {} ({} pages, {} objects)",
            path.display(),
            inner.get_pages().len(),
            inner.objects.len()
        );

        Ok(Self { inner })
    }

    /// Open a PDF document from bytes
    ///
    /// # Arguments
    /// * `data` - PDF file bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;

        Ok(Self { inner })
    }

    /// Copy every page, in order, into a new independent document
    ///
    /// The copy owns its own object graph: mutating or saving it never touches
    /// this document. The catalog (including the AcroForm) comes along so the
    /// widget annotations on the copied pages keep their field parents.
    pub fn copy_document(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Get all page numbers (1-indexed) in order
    pub fn page_numbers(&self) -> Vec<u32> {
        self.inner.get_pages().keys().copied().collect()
    }

    /// Get all page object IDs in order
    pub fn get_page_ids(&self) -> Vec<ObjectId> {
        self.inner.get_pages().values().copied().collect()
    }

    /// Save the document to a file, replacing any existing file
    ///
    /// # Arguments
    /// * `path` - Output file path
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }

    /// Serialize the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Get a mutable reference to the underlying lopdf document
    pub fn inner_mut(&mut self) -> &mut Document {
        &mut self.inner
    }

    /// Object ID of the document catalog
    pub(crate) fn catalog_id(&self) -> Result<ObjectId> {
        let root = self
            .inner
            .trailer
            .get(b"Root")
            .map_err(|_| PdfError::ParseError("Document trailer missing Root entry".to_string()))?;
        root.as_reference()
            .map_err(|_| PdfError::ParseError("Root is not a reference".to_string()))
    }

    /// The document catalog dictionary
    pub(crate) fn catalog(&self) -> Result<&Dictionary> {
        let catalog_id = self.catalog_id()?;
        self.inner
            .get_object(catalog_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Catalog is not a dictionary".to_string()))
    }

    /// Follow indirect references until a direct object is reached
    pub(crate) fn resolve<'a>(&'a self, object: &'a Object) -> Result<&'a Object> {
        let mut current = object;
        // Reference chains longer than this only occur in broken files
        for _ in 0..32 {
            match current {
                Object::Reference(id) => current = self.inner.get_object(*id)?,
                _ => return Ok(current),
            }
        }
        Err(PdfError::ParseError("Reference chain too deep".to_string()))
    }
}
