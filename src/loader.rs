//! Document loaders for plain text and PDF sources.
//!
//! A loader turns a file into an ordered sequence of [`Document`]s carrying
//! provenance metadata. Text files load as a single document; PDFs load one
//! document per page with a 1-based `page` metadata field (PDF support is
//! behind the `pdf` feature).

use std::path::Path;

use tracing::info;

use crate::document::{Document, META_SOURCE};
#[cfg(feature = "pdf")]
use crate::document::META_PAGE;
use crate::error::{AskdocError, Result};

/// Load a plain-text file as a single [`Document`].
///
/// The document ID is derived from the file stem; the full path is recorded
/// in the `source` metadata field.
///
/// # Errors
///
/// Returns [`AskdocError::Input`] if the file cannot be read.
pub fn load_text(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        AskdocError::Input(format!("failed to read '{}': {e}", path.display()))
    })?;

    info!(path = %path.display(), bytes = text.len(), "loaded text document");

    let mut document = Document::new(document_id(path), text)
        .with_metadata(META_SOURCE, path.display().to_string());
    document.source = Some(path.display().to_string());

    Ok(vec![document])
}

/// Load a PDF file as one [`Document`] per page.
///
/// Each page carries a 1-based `page` metadata field. Pages with no
/// extractable text still produce a document; the chunker filters them out,
/// and the pipeline reports an ingest where *every* page is empty as a
/// "no extractable text" input error.
///
/// # Errors
///
/// Returns [`AskdocError::Input`] if the file cannot be parsed as a PDF.
#[cfg(feature = "pdf")]
pub fn load_pdf(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let pdf = lopdf::Document::load(path).map_err(|e| {
        AskdocError::Input(format!("failed to read PDF '{}': {e}", path.display()))
    })?;

    let id = document_id(path);
    let source = path.display().to_string();
    let mut documents = Vec::new();

    for (page_number, _) in pdf.get_pages() {
        // Extraction can fail per page (e.g. image-only pages); treat that
        // as an empty page rather than aborting the whole load.
        let text = pdf.extract_text(&[page_number]).unwrap_or_default();

        let mut document = Document::new(format!("{id}_p{page_number}"), text)
            .with_metadata(META_PAGE, page_number.to_string())
            .with_metadata(META_SOURCE, source.clone());
        document.source = Some(source.clone());
        documents.push(document);
    }

    info!(path = %path.display(), pages = documents.len(), "loaded PDF document");

    Ok(documents)
}

/// Load a file, dispatching on its extension.
///
/// `.pdf` files go through [`load_pdf`]; everything else is treated as
/// plain text.
///
/// # Errors
///
/// Returns [`AskdocError::Input`] if the file cannot be read, or if it is
/// a PDF and the crate was built without the `pdf` feature.
pub fn load_path(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        #[cfg(feature = "pdf")]
        {
            return load_pdf(path);
        }
        #[cfg(not(feature = "pdf"))]
        {
            return Err(AskdocError::Input(format!(
                "'{}' is a PDF but this build lacks the 'pdf' feature",
                path.display()
            )));
        }
    }

    load_text(path)
}

/// Derive a document ID from the file stem.
fn document_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    #[cfg(not(feature = "pdf"))]
    use crate::document::META_PAGE;

    #[test]
    fn load_text_produces_single_document_with_source() {
        let mut file = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
        writeln!(file, "Attendance must be at least 75% to sit for the exam.").unwrap();

        let documents = load_text(file.path()).unwrap();
        assert_eq!(documents.len(), 1);
        assert!(documents[0].text.contains("75%"));
        assert!(documents[0].metadata.contains_key(META_SOURCE));
        assert!(!documents[0].metadata.contains_key(META_PAGE));
    }

    #[test]
    fn load_text_missing_file_is_input_error() {
        let err = load_text("/nonexistent/rules.txt").unwrap_err();
        assert!(matches!(err, AskdocError::Input(_)));
    }

    #[test]
    fn load_path_dispatches_text_files() {
        let mut file = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
        writeln!(file, "some rules").unwrap();

        let documents = load_path(file.path()).unwrap();
        assert_eq!(documents.len(), 1);
    }

    #[cfg(not(feature = "pdf"))]
    #[test]
    fn load_path_rejects_pdf_without_feature() {
        let file = tempfile::NamedTempFile::with_suffix(".pdf").unwrap();
        let err = load_path(file.path()).unwrap_err();
        assert!(matches!(err, AskdocError::Input(_)));
    }
}
