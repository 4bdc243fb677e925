/// Last-resort tier: the resume as a plain `.txt` file.
use std::fs;
use std::path::{Path, PathBuf};

use super::blocks::SectionKind;
use super::scratch::effective_data;
use super::{RenderError, RenderStrategy, ResumeInput, Tier};
use crate::tailor::TailoredResumeData;

pub fn resume_text(input: &ResumeInput<'_>) -> String {
    let data = effective_data(input);
    let mut out = vec![input.profile.display_name().to_string()];
    let contact = input.profile.contact_line();
    if !contact.is_empty() {
        out.push(contact);
    }
    for kind in SectionKind::ALL {
        let lines = section_lines(kind, &data);
        if lines.is_empty() {
            continue;
        }
        out.push(String::new());
        out.push(kind.label().to_string());
        out.extend(lines);
    }
    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn bullet(text: &str) -> String {
    format!("- {}", text.trim())
}

fn non_blank(items: &[String]) -> impl Iterator<Item = &String> {
    items.iter().filter(|s| !s.trim().is_empty())
}

fn section_lines(kind: SectionKind, data: &TailoredResumeData) -> Vec<String> {
    let mut lines = Vec::new();
    match kind {
        SectionKind::Summary => {
            if !data.summary.trim().is_empty() {
                lines.push(data.summary.trim().to_string());
            }
        }
        SectionKind::Experience => {
            for exp in &data.experience {
                let header: Vec<&str> = [&exp.title, &exp.company, &exp.location, &exp.duration]
                    .into_iter()
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .collect();
                if !header.is_empty() {
                    lines.push(header.join(" | "));
                }
                lines.extend(non_blank(&exp.bullets).map(|b| bullet(b)));
            }
        }
        SectionKind::Projects => {
            for project in &data.projects {
                match (project.name.trim(), project.technologies.trim()) {
                    ("", "") => {}
                    (name, "") => lines.push(name.to_string()),
                    ("", tech) => lines.push(tech.to_string()),
                    (name, tech) => lines.push(format!("{name} ({tech})")),
                }
                lines.extend(non_blank(&project.description).map(|d| bullet(d)));
            }
        }
        SectionKind::Skills => {
            for category in data.technical_skills.iter().filter(|c| !c.skills.is_empty()) {
                lines.push(format!("{}: {}", category.name, category.skills.join(", ")));
            }
        }
        SectionKind::Education => {
            for edu in &data.education {
                let parts: Vec<&str> = [&edu.degree, &edu.institution, &edu.date]
                    .into_iter()
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .collect();
                if !parts.is_empty() {
                    lines.push(parts.join(", "));
                }
                lines.extend(non_blank(&edu.details).map(|d| bullet(d)));
            }
        }
        SectionKind::Publications => {
            lines.extend(non_blank(&data.research_publications).map(|p| bullet(p)));
        }
    }
    lines
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PlainText;

impl<'a> RenderStrategy<ResumeInput<'a>> for PlainText {
    fn tier(&self) -> Tier {
        Tier::PlainText
    }

    fn render(&self, input: &ResumeInput<'a>, output: &Path) -> Result<PathBuf, RenderError> {
        write_text(output, &resume_text(input))
    }
}

/// Write `text` next to `output` with a `.txt` extension.
pub fn write_text(output: &Path, text: &str) -> Result<PathBuf, RenderError> {
    let path = output.with_extension("txt");
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, text)?;
    Ok(path)
}
