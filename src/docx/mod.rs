/// Minimal WordprocessingML reader/writer.
///
/// A `.docx` is a zip of XML parts. [`package`] moves parts in and out of the
/// archive, [`xml`] gives an owned, editable tree that round-trips unknown
/// markup, [`styles`] resolves and synthesizes paragraph styles, and
/// [`document`] exposes the body as a list of blocks with the section
/// operations the resume renderer needs.
pub mod build;
pub mod document;
pub mod package;
pub mod styles;
pub mod xml;

use thiserror::Error;

pub use document::Document;
pub use package::DocxPackage;
pub use styles::StyleSheet;

/// Errors raised while reading, editing or writing a `.docx` package.
#[derive(Error, Debug)]
pub enum DocxError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("missing part: {0}")]
    MissingPart(String),

    #[error("malformed document: {0}")]
    Malformed(String),
}

