/// Best-effort plain text out of a resume or letter file.
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use anyhow::{Result, anyhow};
use tracing::{debug, warn};

use crate::docx::Document;

/// Text of a `.pdf`, `.docx` or any other file read as lossy UTF-8.
/// Failures are logged and yield an empty string.
pub fn extract_text<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let result = match ext.as_deref() {
        Some("pdf") => extract_pdf(path),
        Some("docx") => extract_docx(path),
        _ => extract_plain(path),
    };

    match result {
        Ok(text) => {
            debug!("Extracted {} chars from {}", text.len(), path.display());
            text
        }
        Err(e) => {
            warn!("Failed to extract text from {}: {:#}", path.display(), e);
            String::new()
        }
    }
}

fn extract_pdf(path: &Path) -> Result<String> {
    // lopdf panics on some malformed cross-reference tables and fonts
    without_panics("PDF parser", || {
        let doc = lopdf::Document::load(path)?;
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        Ok(doc.extract_text(&pages)?)
    })
}

/// Run a third-party parser, turning a panic into an error.
fn without_panics<F>(what: &str, f: F) -> Result<String>
where
    F: FnOnce() -> Result<String>,
{
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_default();
        Err(anyhow!("{what} panicked: {msg}"))
    })
}

fn extract_docx(path: &Path) -> Result<String> {
    Ok(Document::open(path)?.text())
}

fn extract_plain(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::build::Paragraph;

    #[test]
    fn test_plain_text_is_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        fs::write(&path, b"Jane Doe\n\xffPython").unwrap();
        let text = extract_text(&path);
        assert!(text.starts_with("Jane Doe\n"));
        assert!(text.ends_with("Python"));
    }

    #[test]
    fn test_docx_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.docx");
        let mut doc = Document::blank().unwrap();
        doc.append_blocks(vec![
            Paragraph::new().text("Jane Doe").into_element(),
            Paragraph::new().text("jane@example.com").into_element(),
        ]);
        doc.save(&path).unwrap();

        assert_eq!(extract_text(&path), "Jane Doe\njane@example.com");
    }

    #[test]
    fn test_failures_yield_empty_string() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(extract_text(dir.path().join("missing.txt")), "");

        let bad_pdf = dir.path().join("bad.PDF");
        fs::write(&bad_pdf, "not a pdf").unwrap();
        assert_eq!(extract_text(&bad_pdf), "");

        let bad_docx = dir.path().join("bad.docx");
        fs::write(&bad_docx, "not a zip").unwrap();
        assert_eq!(extract_text(&bad_docx), "");
    }

    #[test]
    fn test_parser_panic_becomes_error() {
        let err = without_panics("PDF parser", || panic!("bad xref")).unwrap_err();
        assert_eq!(err.to_string(), "PDF parser panicked: bad xref");

        let ok = without_panics("PDF parser", || Ok("text".to_string())).unwrap();
        assert_eq!(ok, "text");
    }
}
