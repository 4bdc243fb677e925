/// Zip container for a `.docx` file.
///
/// Every part is held in memory in archive order so untouched parts (images,
/// numbering, headers, theme) are written back byte-for-byte.
use std::fs::{self, File};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::DocxError;
use super::xml::{self, Element, XmlDocument};

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

const STYLES_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const STYLES_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

const BLANK_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const BLANK_ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const BLANK_DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#;

// Letter size, 0.75in margins
const BLANK_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1080" w:right="1080" w:bottom="1080" w:left="1080" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#;

#[derive(Debug, Clone, Default)]
pub struct DocxPackage {
    parts: Vec<(String, Vec<u8>)>,
}

impl DocxPackage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DocxError> {
        let path = path.as_ref();
        debug!("Opening docx package: {}", path.display());
        Self::from_reader(File::open(path)?)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DocxError> {
        Self::from_reader(Cursor::new(bytes))
    }

    fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            parts.push((name, data));
        }
        Ok(Self { parts })
    }

    /// An empty single-section document with no styles part.
    pub fn blank() -> Self {
        let mut pkg = Self::default();
        pkg.set_part(CONTENT_TYPES_PART, BLANK_CONTENT_TYPES.as_bytes().to_vec());
        pkg.set_part("_rels/.rels", BLANK_ROOT_RELS.as_bytes().to_vec());
        pkg.set_part(DOCUMENT_RELS_PART, BLANK_DOCUMENT_RELS.as_bytes().to_vec());
        pkg.set_part(DOCUMENT_PART, BLANK_DOCUMENT.as_bytes().to_vec());
        pkg
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = data,
            None => self.parts.push((name.to_string(), data)),
        }
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(n, _)| n.as_str())
    }

    /// Parse an XML part.
    pub fn xml_part(&self, name: &str) -> Result<XmlDocument, DocxError> {
        let data = self
            .part(name)
            .ok_or_else(|| DocxError::MissingPart(name.to_string()))?;
        let text = std::str::from_utf8(data).map_err(|e| DocxError::Malformed(e.to_string()))?;
        xml::parse(text)
    }

    pub fn set_xml_part(&mut self, name: &str, doc: &XmlDocument) -> Result<(), DocxError> {
        let text = xml::serialize(doc)?;
        self.set_part(name, text.into_bytes());
        Ok(())
    }

    /// Register `word/styles.xml` in the content types and the document
    /// relationships if the package does not already reference it.
    pub fn register_styles_part(&mut self) -> Result<(), DocxError> {
        let mut types = self.xml_part(CONTENT_TYPES_PART)?;
        let registered = types
            .root
            .elements()
            .any(|el| el.is("Override") && el.attr("PartName") == Some("/word/styles.xml"));
        if !registered {
            types.root.children.push(xml::Node::Element(
                Element::new("Override")
                    .with_attr("PartName", "/word/styles.xml")
                    .with_attr("ContentType", STYLES_CONTENT_TYPE),
            ));
            self.set_xml_part(CONTENT_TYPES_PART, &types)?;
        }

        let mut rels = match self.xml_part(DOCUMENT_RELS_PART) {
            Ok(rels) => rels,
            Err(DocxError::MissingPart(_)) => xml::parse(BLANK_DOCUMENT_RELS)?,
            Err(e) => return Err(e),
        };
        let linked = rels
            .root
            .elements()
            .any(|el| el.attr("Type") == Some(STYLES_REL_TYPE));
        if !linked {
            let taken: Vec<&str> = rels.root.elements().filter_map(|el| el.attr("Id")).collect();
            let id = (1..)
                .map(|n| format!("rId{n}"))
                .find(|id| !taken.contains(&id.as_str()))
                .unwrap_or_else(|| "rIdStyles".to_string());
            rels.root.children.push(xml::Node::Element(
                Element::new("Relationship")
                    .with_attr("Id", &id)
                    .with_attr("Type", STYLES_REL_TYPE)
                    .with_attr("Target", "styles.xml"),
            ));
            self.set_xml_part(DOCUMENT_RELS_PART, &rels)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut out = Cursor::new(Vec::new());
        self.write_to(&mut out)?;
        Ok(out.into_inner())
    }

    fn write_to<W: Write + Seek>(&self, writer: W) -> Result<(), DocxError> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }
        zip.finish()?;
        Ok(())
    }

    /// Write to a sibling temp file, then rename over `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DocxError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("docx.tmp");
        let result = File::create(&tmp)
            .map_err(DocxError::from)
            .and_then(|file| self.write_to(file));
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, path)?;
        debug!("Saved docx package: {}", path.display());
        Ok(())
    }
}
