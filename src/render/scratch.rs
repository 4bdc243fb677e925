/// Tier 2: build a plainly styled resume in a blank document.
use std::path::{Path, PathBuf};

use super::blocks::{BlockStyles, SectionKind, profile_data};
use super::{RenderError, RenderStrategy, ResumeInput, Tier};
use crate::docx::Document;
use crate::docx::build::{Paragraph, blank_paragraph};
use crate::tailor::TailoredResumeData;

/// Tailored data when there is any, else the source resume's own content.
/// An empty tailored summary falls back to the profile summary.
pub fn effective_data(input: &ResumeInput<'_>) -> TailoredResumeData {
    if input.tailored.is_empty() {
        return profile_data(input.profile);
    }
    let mut data = input.tailored.clone();
    if data.summary.trim().is_empty() {
        data.summary = input.profile.summary.clone();
    }
    data
}

pub fn build_document(input: &ResumeInput<'_>) -> Result<Document, RenderError> {
    let mut doc = Document::blank()?;
    let styles = BlockStyles::resolve(&mut doc);
    let data = effective_data(input);

    let mut blocks = vec![
        Paragraph::styled(&styles.title)
            .text(input.profile.display_name())
            .centered()
            .into_element(),
    ];
    let contact = input.profile.contact_line();
    if !contact.is_empty() {
        blocks.push(styles.paragraph().text(contact).centered().into_element());
    }
    for kind in SectionKind::ALL {
        let content = kind.blocks(&data, &styles);
        if content.is_empty() {
            continue;
        }
        blocks.push(blank_paragraph());
        blocks.push(styles.heading(kind.label()));
        blocks.extend(content);
    }
    doc.append_blocks(blocks);
    Ok(doc)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ScratchBuild;

impl<'a> RenderStrategy<ResumeInput<'a>> for ScratchBuild {
    fn tier(&self) -> Tier {
        Tier::ScratchBuild
    }

    fn render(&self, input: &ResumeInput<'a>, output: &Path) -> Result<PathBuf, RenderError> {
        let mut doc = build_document(input)?;
        let path = output.with_extension("docx");
        doc.save(&path)?;
        Ok(path)
    }
}
