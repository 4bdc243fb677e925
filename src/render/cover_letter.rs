/// Cover letter assembly and rendering.
///
/// The body comes from the model when it answers, otherwise from
/// [`heuristic_body`]. Rendering reuses the [`Ladder`] with a DOCX tier and a
/// plain-text tier.
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::plain_text::write_text;
use super::{Ladder, RenderError, RenderStrategy, Tier};
use crate::docx::Document;
use crate::docx::build::{Paragraph, Run, blank_paragraph};
use crate::parser::{ParsedJob, ResumeProfile};

const SALUTATION: &str = "Dear Hiring Manager,";
const CLOSING: &str = "Sincerely,";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetter {
    pub date: String,
    pub recipient: Vec<String>,
    pub salutation: String,
    pub body: Vec<String>,
    pub closing: String,
    /// Name, then the contact line when there is one.
    pub signature: Vec<String>,
}

impl CoverLetter {
    pub fn new(profile: &ResumeProfile, job: &ParsedJob, body: Vec<String>, date: NaiveDate) -> Self {
        let mut recipient = vec!["Hiring Manager".to_string()];
        recipient.extend(
            [&job.company, &job.location]
                .into_iter()
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string()),
        );
        let mut signature = vec![profile.display_name().to_string()];
        let contact = profile.contact_line();
        if !contact.is_empty() {
            signature.push(contact);
        }
        Self {
            date: date.format("%B %d, %Y").to_string(),
            recipient,
            salutation: SALUTATION.to_string(),
            body,
            closing: CLOSING.to_string(),
            signature,
        }
    }

    pub fn text(&self) -> String {
        let mut blocks = vec![self.date.clone(), self.recipient.join("\n"), self.salutation.clone()];
        blocks.extend(self.body.iter().cloned());
        blocks.push(format!("{}\n{}", self.closing, self.signature.join("\n")));
        let mut text = blocks.join("\n\n");
        text.push('\n');
        text
    }

    fn ensure_body(&self) -> Result<(), RenderError> {
        if self.body.iter().all(|p| p.trim().is_empty()) {
            return Err(RenderError::NoContent("cover letter body is empty".into()));
        }
        Ok(())
    }
}

/// Split a model reply into body paragraphs, dropping any greeting or
/// sign-off lines the model added itself.
pub fn body_from_completion(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        let lower = line.to_lowercase();
        let boilerplate = lower.starts_with("dear ")
            || lower.starts_with("sincerely")
            || lower.starts_with("best regards")
            || lower.starts_with("kind regards");
        if line.is_empty() || boilerplate {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
            if lower.starts_with("sincerely") || lower.ends_with("regards,") {
                break;
            }
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }
    paragraphs
}

/// Template body used when the model gives nothing back.
pub fn heuristic_body(profile: &ResumeProfile, job: &ParsedJob) -> Vec<String> {
    let position = if job.title.trim().is_empty() {
        "this position".to_string()
    } else {
        format!("the {} position", job.title.trim())
    };
    let company = if job.company.trim().is_empty() {
        "your company"
    } else {
        job.company.trim()
    };

    let mut body = vec![format!(
        "I am excited to apply for {position} at {company}. \
         I am confident that my skills and experience make me a strong candidate."
    )];

    let top: Vec<&str> = profile.skills.iter().take(5).map(String::as_str).collect();
    if let Some((last, rest)) = top.split_last() {
        let list = if rest.is_empty() {
            last.to_string()
        } else {
            format!("{}, and {}", rest.join(", "), last)
        };
        let mut para = format!("My technical expertise includes {list}. ");
        if !job.requirements.is_empty() {
            para.push_str(
                "My background in these areas aligns directly with the key requirements of this role. ",
            );
        }
        para.push_str("I am eager to bring these skills to your team.");
        body.push(para);
    }

    body.push(format!(
        "I am particularly interested in this opportunity because I admire {company}'s work \
         in the industry, and I am excited about the prospect of contributing to your team."
    ));

    let mut closing = String::from(
        "Thank you for considering my application. I would welcome the opportunity to \
         discuss how my experience aligns with your needs",
    );
    let reach: Vec<&str> = [&profile.phone, &profile.email]
        .into_iter()
        .filter(|s| !s.is_empty())
        .map(String::as_str)
        .collect();
    if reach.is_empty() {
        closing.push('.');
    } else {
        closing.push_str(&format!(", and can be reached at {}.", reach.join(" or ")));
    }
    body.push(closing);
    body
}

/// DOCX letter built in a blank document.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxLetter;

impl RenderStrategy<CoverLetter> for DocxLetter {
    fn tier(&self) -> Tier {
        Tier::ScratchBuild
    }

    fn render(&self, letter: &CoverLetter, output: &Path) -> Result<PathBuf, RenderError> {
        letter.ensure_body()?;
        let mut doc = Document::blank()?;
        let normal = doc.ensure_style("Normal").id;
        let para = |text: &str| Paragraph::styled(&normal).text(text).into_element();

        let mut blocks = vec![para(&letter.date), blank_paragraph()];
        blocks.extend(letter.recipient.iter().map(|l| para(l)));
        blocks.push(blank_paragraph());
        blocks.push(para(&letter.salutation));
        for p in letter.body.iter().filter(|p| !p.trim().is_empty()) {
            blocks.push(blank_paragraph());
            blocks.push(para(p));
        }
        blocks.push(blank_paragraph());
        blocks.push(para(&letter.closing));
        let mut signature = letter.signature.iter();
        if let Some(name) = signature.next() {
            blocks.push(
                Paragraph::styled(&normal)
                    .run(Run::new(name.as_str()).bold())
                    .into_element(),
            );
        }
        blocks.extend(signature.map(|l| para(l)));
        doc.append_blocks(blocks);

        let path = output.with_extension("docx");
        doc.save(&path)?;
        Ok(path)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TextLetter;

impl RenderStrategy<CoverLetter> for TextLetter {
    fn tier(&self) -> Tier {
        Tier::PlainText
    }

    fn render(&self, letter: &CoverLetter, output: &Path) -> Result<PathBuf, RenderError> {
        letter.ensure_body()?;
        write_text(output, &letter.text())
    }
}

pub fn cover_letter_ladder() -> Ladder<CoverLetter> {
    Ladder::new(vec![Box::new(DocxLetter), Box::new(TextLetter)])
}
