/// Template-preserving resume mutation.
///
/// Section headings are located once per document into a [`SectionIndex`].
/// Each found section with data has its content replaced in place; sections
/// with data but no heading are appended at the end; everything else in the
/// template is carried through byte-for-byte at the XML level.
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::blocks::{BlockStyles, SectionKind};
use super::{RenderError, RenderStrategy, ResumeInput, Tier};
use crate::docx::Document;
use crate::docx::build::{Paragraph, blank_paragraph};
use crate::docx::document::paragraph_text;
use crate::tailor::TailoredResumeData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Found {
    heading: usize,
    rank: usize,
}

/// Where each recognised section sits in a document.
#[derive(Debug, Clone, Default)]
pub struct SectionIndex {
    found: BTreeMap<SectionKind, Found>,
    /// Every paragraph recognised as some section's heading, ascending.
    headings: Vec<usize>,
}

impl SectionIndex {
    /// Single pass over the paragraphs. When several headings match one
    /// section, the most preferred synonym wins, then the earliest.
    pub fn build(doc: &Document) -> Self {
        let mut index = Self::default();
        for (i, p) in doc.paragraphs() {
            let text = paragraph_text(p);
            if text.trim().is_empty() {
                continue;
            }
            let mut recognised = false;
            for kind in SectionKind::ALL {
                let Some(rank) = kind.match_rank(&text) else {
                    continue;
                };
                recognised = true;
                let better = index.found.get(&kind).is_none_or(|f| rank < f.rank);
                if better {
                    index.found.insert(kind, Found { heading: i, rank });
                }
            }
            if recognised {
                index.headings.push(i);
            }
        }
        index
    }

    pub fn heading(&self, kind: SectionKind) -> Option<usize> {
        self.found.get(&kind).map(|f| f.heading)
    }

    pub fn len(&self) -> usize {
        self.found.len()
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    /// Content blocks of `kind`: after its heading, up to the next
    /// heading-styled paragraph or recognised section heading.
    pub fn span(&self, doc: &Document, kind: SectionKind) -> Option<Range<usize>> {
        let heading = self.heading(kind)?;
        let styled = doc.next_heading_after(heading);
        let recognised = self.headings.iter().copied().find(|&h| h > heading);
        let end = [styled, recognised]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or_else(|| doc.content_end());
        Some(heading + 1..end)
    }
}

/// Which sections a mutation touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationReport {
    pub replaced: Vec<SectionKind>,
    pub appended: Vec<SectionKind>,
    /// Found in the template but left as-is for lack of data.
    pub untouched: Vec<SectionKind>,
}

/// Rewrite `doc`'s sections from `data`.
pub fn apply_tailored(doc: &mut Document, data: &TailoredResumeData) -> MutationReport {
    let styles = BlockStyles::resolve(doc);
    let index = SectionIndex::build(doc);
    let mut report = MutationReport::default();

    // bottom-up so earlier indices stay valid
    let mut found: Vec<(SectionKind, usize)> = SectionKind::ALL
        .into_iter()
        .filter_map(|k| index.heading(k).map(|h| (k, h)))
        .collect();
    found.sort_by(|a, b| b.1.cmp(&a.1));

    let mut heading_style = None;
    for &(kind, heading) in &found {
        if heading_style.is_none() {
            heading_style = doc.blocks()[heading]
                .as_element()
                .and_then(|p| p.child("w:pPr"))
                .and_then(|ppr| ppr.child("w:pStyle"))
                .and_then(|s| s.attr("w:val"))
                .map(str::to_string);
        }
        if !kind.has_data(data) {
            debug!("No data for {}; leaving template section as-is", kind);
            report.untouched.push(kind);
            continue;
        }
        let Some(span) = index.span(doc, kind) else {
            continue;
        };
        let bounded = span.end < doc.content_end();
        let mut blocks = kind.blocks(data, &styles);
        if bounded {
            blocks.push(blank_paragraph());
        }
        debug!(
            "Replacing {} blocks of {} with {}",
            span.len(),
            kind,
            blocks.len()
        );
        doc.replace_range(span, blocks);
        report.replaced.push(kind);
    }
    report.replaced.reverse();
    report.untouched.reverse();

    let heading_style = heading_style.unwrap_or_else(|| styles.heading.clone());
    for kind in SectionKind::ALL {
        if index.heading(kind).is_some() || !kind.has_data(data) {
            continue;
        }
        let mut blocks = Vec::new();
        if doc.content_end() > 0 {
            blocks.push(blank_paragraph());
        }
        blocks.push(
            Paragraph::styled(&heading_style)
                .text(kind.label())
                .into_element(),
        );
        blocks.extend(kind.blocks(data, &styles));
        doc.append_blocks(blocks);
        report.appended.push(kind);
    }
    report
}

/// Tier 1: mutate the configured DOCX template.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateMutation;

impl<'a> RenderStrategy<ResumeInput<'a>> for TemplateMutation {
    fn tier(&self) -> Tier {
        Tier::TemplateMutation
    }

    fn render(&self, input: &ResumeInput<'a>, output: &Path) -> Result<PathBuf, RenderError> {
        let template = input.template.ok_or(RenderError::NoTemplate)?;
        if input.tailored.is_empty() {
            return Err(RenderError::NoContent("tailored resume is empty".into()));
        }
        let mut doc = Document::open(template)?;
        let report = apply_tailored(&mut doc, input.tailored);
        info!(
            "Template {}: replaced {:?}, appended {:?}",
            template.display(),
            report.replaced,
            report.appended
        );
        let path = output.with_extension("docx");
        doc.save(&path)?;
        Ok(path)
    }
}
