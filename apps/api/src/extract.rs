//! CV text extraction. The pipeline treats an uploaded CV as an opaque
//! document and only ever sees its plain text.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to extract text from PDF: {0}")]
    Pdf(String),

    #[error("unsupported document format '{0}': upload a .pdf, .txt, or .md file")]
    UnsupportedFormat(String),

    #[error("document contained no extractable text")]
    Empty,
}

/// Extracts plain text from an uploaded CV document, dispatching on the file
/// extension. PDF extraction is synchronous; handlers call this through
/// `spawn_blocking`.
pub fn extract_document_text(path: &Path) -> Result<String, ExtractError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => pdf_extract::extract_text(path).map_err(|e| ExtractError::Pdf(e.to_string()))?,
        "txt" | "md" => std::fs::read_to_string(path)?,
        other => return Err(ExtractError::UnsupportedFormat(other.to_string())),
    };

    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn temp_doc(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("cv-")
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_extracts_plain_text_file() {
        let file = temp_doc(".txt", "Ten years of systems programming.");
        let text = extract_document_text(file.path()).unwrap();
        assert_eq!(text, "Ten years of systems programming.");
    }

    #[test]
    fn test_extracts_markdown_file() {
        let file = temp_doc(".md", "# Experience\n- Rust");
        assert!(extract_document_text(file.path()).is_ok());
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let file = temp_doc(".docx", "binary-ish");
        let err = extract_document_text(file.path()).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(ext) if ext == "docx"));
    }

    #[test]
    fn test_missing_extension_is_rejected() {
        let err = extract_document_text(Path::new("/tmp/no-extension")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(ext) if ext.is_empty()));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = extract_document_text(Path::new("/nonexistent/cv.txt")).unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }

    #[test]
    fn test_whitespace_only_document_is_empty() {
        let file = temp_doc(".txt", "   \n\t  ");
        let err = extract_document_text(file.path()).unwrap_err();
        assert!(matches!(err, ExtractError::Empty));
    }
}
