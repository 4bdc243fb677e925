/// Body-level view of `word/document.xml`.
///
/// The body is held as a flat list of blocks (`w:p`, `w:tbl`, trailing
/// `w:sectPr`). Section operations work on block indices; everything inside a
/// block that is not rewritten is carried through untouched.
use std::ops::Range;
use std::path::Path;

use tracing::debug;

use super::DocxError;
use super::package::{DOCUMENT_PART, DocxPackage, STYLES_PART};
use super::styles::{EnsuredStyle, StyleSheet, is_heading_style_name};
use super::xml::{Element, Node, XmlDocument};

#[derive(Debug, Clone)]
pub struct Document {
    package: DocxPackage,
    xml: XmlDocument,
    blocks: Vec<Node>,
    styles: StyleSheet,
    styles_present: bool,
}

impl Document {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DocxError> {
        Self::from_package(DocxPackage::open(path)?)
    }

    /// Empty document with a generated styles part.
    pub fn blank() -> Result<Self, DocxError> {
        Self::from_package(DocxPackage::blank())
    }

    pub fn from_package(package: DocxPackage) -> Result<Self, DocxError> {
        let mut xml = package.xml_part(DOCUMENT_PART)?;
        let body = xml
            .root
            .child_mut("w:body")
            .ok_or_else(|| DocxError::Malformed("document has no w:body".into()))?;
        let mut blocks = std::mem::take(&mut body.children);
        blocks.retain(|n| !matches!(n, Node::Text(t) if t.trim().is_empty()));

        let (styles, styles_present) = match package.xml_part(STYLES_PART) {
            Ok(xml) => (StyleSheet::from_xml(xml), true),
            Err(DocxError::MissingPart(_)) => (StyleSheet::empty(), false),
            Err(e) => return Err(e),
        };

        debug!(
            "Loaded document: {} blocks, styles part {}",
            blocks.len(),
            if styles_present { "present" } else { "missing" }
        );
        Ok(Self {
            package,
            xml,
            blocks,
            styles,
            styles_present,
        })
    }

    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<(), DocxError> {
        let mut xml = self.xml.clone();
        let body = xml
            .root
            .child_mut("w:body")
            .ok_or_else(|| DocxError::Malformed("document has no w:body".into()))?;
        body.children = self.blocks.clone();
        self.package.set_xml_part(DOCUMENT_PART, &xml)?;

        self.package.set_xml_part(STYLES_PART, self.styles.xml())?;
        if !self.styles_present {
            self.package.register_styles_part()?;
            self.styles_present = true;
        }
        self.package.save(path)
    }

    pub fn blocks(&self) -> &[Node] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Index past the last content block; a trailing `w:sectPr` stays last.
    pub fn content_end(&self) -> usize {
        match self.blocks.last().and_then(Node::as_element) {
            Some(el) if el.is("w:sectPr") => self.blocks.len() - 1,
            _ => self.blocks.len(),
        }
    }

    fn paragraph(&self, idx: usize) -> Option<&Element> {
        self.blocks
            .get(idx)
            .and_then(Node::as_element)
            .filter(|el| el.is("w:p"))
    }

    /// `(index, paragraph)` for every top-level paragraph.
    pub fn paragraphs(&self) -> impl Iterator<Item = (usize, &Element)> {
        self.blocks.iter().enumerate().filter_map(|(i, n)| {
            n.as_element().filter(|el| el.is("w:p")).map(|el| (i, el))
        })
    }

    pub fn paragraph_text(&self, idx: usize) -> Option<String> {
        self.paragraph(idx).map(paragraph_text)
    }

    /// Display name of a paragraph's style, falling back to the raw id.
    pub fn style_name(&self, paragraph: &Element) -> Option<String> {
        let id = paragraph
            .child("w:pPr")
            .and_then(|ppr| ppr.child("w:pStyle"))
            .and_then(|s| s.attr("w:val"))?;
        Some(
            self.styles
                .name_for_id(id)
                .unwrap_or(id)
                .to_string(),
        )
    }

    /// Whether the block at `idx` is a heading, title or subtitle paragraph.
    pub fn is_heading(&self, idx: usize) -> bool {
        self.paragraph(idx)
            .and_then(|p| self.style_name(p))
            .is_some_and(|name| is_heading_style_name(&name))
    }

    /// First paragraph whose trimmed text equals `name`, ignoring case.
    pub fn find_section_heading(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_uppercase();
        self.paragraphs()
            .find(|(_, p)| paragraph_text(p).trim().to_uppercase() == wanted)
            .map(|(i, _)| i)
    }

    /// Index of the next heading-styled paragraph after `start`.
    pub fn next_heading_after(&self, start: usize) -> Option<usize> {
        (start + 1..self.content_end()).find(|&i| self.is_heading(i))
    }

    /// Remove every block after `start` up to the next heading-styled
    /// paragraph. Returns the heading's new index, or `None` when the cleared
    /// region ran to the end of the document.
    pub fn clear_until_next_heading(&mut self, start: usize) -> Option<usize> {
        if start >= self.content_end() {
            return None;
        }
        let boundary = self.next_heading_after(start);
        let end = boundary.unwrap_or_else(|| self.content_end());
        let removed = self.blocks.drain(start + 1..end).count();
        debug!("Cleared {} blocks after index {}", removed, start);
        boundary.map(|_| start + 1)
    }

    /// Replace `range` with `blocks`.
    pub fn replace_range(&mut self, range: Range<usize>, blocks: Vec<Element>) {
        let end = range.end.min(self.content_end());
        let start = range.start.min(end);
        self.blocks
            .splice(start..end, blocks.into_iter().map(Node::Element));
    }

    pub fn insert_blocks(&mut self, at: usize, blocks: Vec<Element>) {
        self.replace_range(at..at, blocks);
    }

    /// Append before the trailing section properties.
    pub fn append_blocks(&mut self, blocks: Vec<Element>) {
        let end = self.content_end();
        self.insert_blocks(end, blocks);
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    pub fn ensure_style(&mut self, name: &str) -> EnsuredStyle {
        self.styles.ensure_paragraph_style(name)
    }

    /// Plain text of the whole body, one line per paragraph (table cells
    /// included).
    pub fn text(&self) -> String {
        let mut lines = Vec::new();
        for block in self.blocks.iter().filter_map(Node::as_element) {
            collect_paragraph_lines(block, &mut lines);
        }
        lines.join("\n")
    }
}

fn collect_paragraph_lines(el: &Element, out: &mut Vec<String>) {
    if el.is("w:p") {
        out.push(paragraph_text(el));
        return;
    }
    for child in el.elements() {
        collect_paragraph_lines(child, out);
    }
}

/// Visible text of a paragraph: `w:t` runs, tabs and breaks.
pub fn paragraph_text(paragraph: &Element) -> String {
    let mut out = String::new();
    push_text(paragraph, &mut out);
    out
}

fn push_text(el: &Element, out: &mut String) {
    for child in el.elements() {
        match child.name.as_str() {
            "w:t" => out.push_str(&child.text()),
            "w:tab" => out.push('\t'),
            "w:br" | "w:cr" => out.push('\n'),
            "w:pPr" | "w:rPr" | "mc:Fallback" => {}
            _ => push_text(child, out),
        }
    }
}
