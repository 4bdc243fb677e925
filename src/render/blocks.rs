/// Resume sections and the body blocks each one renders to.
///
/// Both DOCX tiers draw from here: the template tier splices these blocks
/// into an existing section, the scratch tier stacks them under fresh
/// headings.
use std::fmt;

use crate::docx::Document;
use crate::docx::build::{Paragraph, Run, blank_paragraph, two_column_table};
use crate::docx::xml::Element;
use crate::parser::ResumeProfile;
use crate::parser::response::DEFAULT_SKILL_CATEGORY;
use crate::tailor::{
    EducationEntry, ExperienceEntry, ProjectEntry, SkillCategory, TailoredResumeData,
};

/// Right edge of the text area on a letter page with 0.75in margins.
pub const RIGHT_TAB_POS: u32 = 10080;
pub const SKILLS_WIDTHS: [u32; 2] = [2520, 7560];
pub const EDUCATION_WIDTHS: [u32; 2] = [7920, 2160];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    Summary,
    Experience,
    Projects,
    Skills,
    Education,
    Publications,
}

impl SectionKind {
    /// Canonical document order.
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Summary,
        SectionKind::Experience,
        SectionKind::Projects,
        SectionKind::Skills,
        SectionKind::Education,
        SectionKind::Publications,
    ];

    /// Heading text used when the section has to be created.
    pub fn label(self) -> &'static str {
        match self {
            SectionKind::Summary => "SUMMARY",
            SectionKind::Experience => "EXPERIENCE",
            SectionKind::Projects => "PROJECTS",
            SectionKind::Skills => "SKILLS",
            SectionKind::Education => "EDUCATION",
            SectionKind::Publications => "RESEARCH PUBLICATIONS",
        }
    }

    /// Heading texts recognised for this section, most preferred first.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            SectionKind::Summary => &[
                "SUMMARY",
                "PROFESSIONAL SUMMARY",
                "PROFILE",
                "OBJECTIVE",
                "ABOUT ME",
            ],
            SectionKind::Experience => &[
                "EXPERIENCE",
                "PROFESSIONAL EXPERIENCE",
                "WORK EXPERIENCE",
                "EMPLOYMENT",
                "EMPLOYMENT HISTORY",
            ],
            SectionKind::Projects => &["PROJECTS", "PERSONAL PROJECTS", "SIDE PROJECTS"],
            SectionKind::Skills => &[
                "SKILLS",
                "TECHNICAL SKILLS",
                "TECHNICAL_SKILLS",
                "CORE SKILLS",
            ],
            SectionKind::Education => &["EDUCATION", "ACADEMICS", "ACADEMIC BACKGROUND"],
            SectionKind::Publications => &[
                "RESEARCH PUBLICATIONS",
                "RESEARCH & PUBLICATIONS",
                "RESEARCH_PUBLICATIONS",
                "PUBLICATIONS",
            ],
        }
    }

    /// Rank of `text` among this section's synonyms, if it is one.
    pub fn match_rank(self, text: &str) -> Option<usize> {
        let key = text.trim().to_uppercase();
        self.synonyms().iter().position(|s| *s == key)
    }

    /// Whether `data` carries anything for this section.
    pub fn has_data(self, data: &TailoredResumeData) -> bool {
        match self {
            SectionKind::Summary => !data.summary.trim().is_empty(),
            SectionKind::Experience => !data.experience.is_empty(),
            SectionKind::Projects => !data.projects.is_empty(),
            SectionKind::Skills => data.skill_count() > 0,
            SectionKind::Education => !data.education.is_empty(),
            SectionKind::Publications => data
                .research_publications
                .iter()
                .any(|p| !p.trim().is_empty()),
        }
    }

    /// Content blocks for this section, blank-separated between entries.
    pub fn blocks(self, data: &TailoredResumeData, styles: &BlockStyles) -> Vec<Element> {
        let entries = match self {
            SectionKind::Summary => summary_entries(&data.summary, styles),
            SectionKind::Experience => data
                .experience
                .iter()
                .map(|e| experience_entry(e, styles))
                .collect(),
            SectionKind::Projects => data
                .projects
                .iter()
                .map(|p| project_entry(p, styles))
                .collect(),
            SectionKind::Skills => skills_entries(&data.technical_skills, styles),
            SectionKind::Education => education_entries(&data.education, styles),
            SectionKind::Publications => publication_entries(&data.research_publications, styles),
        };
        join_entries(entries)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Paragraph style ids resolved (or synthesized) in the target document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockStyles {
    pub normal: String,
    pub heading: String,
    pub title: String,
    pub bullet: String,
    /// The bullet style carries no numbering, so bullets get a literal marker.
    pub bullet_marker: bool,
}

impl BlockStyles {
    pub fn resolve(doc: &mut Document) -> Self {
        let normal = doc.ensure_style("Normal").id;
        let heading = doc.ensure_style("Heading 1").id;
        let title = doc.ensure_style("Title").id;
        let bullet = doc.ensure_style("List Bullet");
        Self {
            normal,
            heading,
            title,
            bullet: bullet.id,
            bullet_marker: bullet.synthesized,
        }
    }

    pub fn paragraph(&self) -> Paragraph {
        Paragraph::styled(&self.normal)
    }

    pub fn bullet(&self, text: &str) -> Element {
        let text = text.trim();
        let text = if self.bullet_marker {
            format!("• {text}")
        } else {
            text.to_string()
        };
        Paragraph::styled(&self.bullet).text(text).into_element()
    }

    pub fn heading(&self, text: &str) -> Element {
        Paragraph::styled(&self.heading).text(text).into_element()
    }
}

/// Flatten entries with one blank paragraph between consecutive entries.
pub fn join_entries(entries: Vec<Vec<Element>>) -> Vec<Element> {
    let mut out = Vec::new();
    for entry in entries.into_iter().filter(|e| !e.is_empty()) {
        if !out.is_empty() {
            out.push(blank_paragraph());
        }
        out.extend(entry);
    }
    out
}

fn summary_entries(summary: &str, styles: &BlockStyles) -> Vec<Vec<Element>> {
    let summary = summary.trim();
    if summary.is_empty() {
        return Vec::new();
    }
    vec![vec![styles.paragraph().text(summary).into_element()]]
}

fn experience_entry(exp: &ExperienceEntry, styles: &BlockStyles) -> Vec<Element> {
    let mut blocks = Vec::new();
    let header: Vec<&str> = [&exp.title, &exp.company, &exp.location]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    let duration = exp.duration.trim();

    if !header.is_empty() || !duration.is_empty() {
        let mut p = styles.paragraph().right_tab(RIGHT_TAB_POS);
        if !header.is_empty() {
            p = p.run(Run::new(header.join(" • ")).bold());
        }
        if !duration.is_empty() {
            p = p.run(Run::new(duration).italic().after_tab());
        }
        blocks.push(p.into_element());
    }
    blocks.extend(
        exp.bullets
            .iter()
            .filter(|b| !b.trim().is_empty())
            .map(|b| styles.bullet(b)),
    );
    blocks
}

fn project_entry(project: &ProjectEntry, styles: &BlockStyles) -> Vec<Element> {
    let mut blocks = Vec::new();
    let name = project.name.trim();
    let tech = project.technologies.trim();
    if !name.is_empty() || !tech.is_empty() {
        let mut p = styles.paragraph();
        if !name.is_empty() {
            p = p.run(Run::new(name).bold());
        }
        if !tech.is_empty() {
            let sep = if name.is_empty() { "" } else { " | " };
            p = p.run(Run::new(format!("{sep}{tech}")).italic());
        }
        blocks.push(p.into_element());
    }
    blocks.extend(
        project
            .description
            .iter()
            .filter(|d| !d.trim().is_empty())
            .map(|d| styles.bullet(d)),
    );
    blocks
}

fn skills_entries(categories: &[SkillCategory], styles: &BlockStyles) -> Vec<Vec<Element>> {
    let rows: Vec<(Paragraph, Paragraph)> = categories
        .iter()
        .filter(|c| !c.skills.is_empty())
        .map(|c| {
            let name = if c.name.trim().is_empty() {
                DEFAULT_SKILL_CATEGORY
            } else {
                c.name.trim()
            };
            (
                styles.paragraph().run(Run::new(name).bold()),
                styles.paragraph().text(c.skills.join(", ")),
            )
        })
        .collect();
    if rows.is_empty() {
        return Vec::new();
    }
    vec![vec![two_column_table(rows, SKILLS_WIDTHS)]]
}

fn education_entries(education: &[EducationEntry], styles: &BlockStyles) -> Vec<Vec<Element>> {
    let rows: Vec<(Paragraph, Paragraph)> = education
        .iter()
        .map(|e| {
            let mut left = styles.paragraph().run(Run::new(e.degree.trim()).bold());
            let mut lines: Vec<&str> = Vec::new();
            if !e.institution.trim().is_empty() {
                lines.push(e.institution.trim());
            }
            lines.extend(e.details.iter().map(|d| d.trim()).filter(|d| !d.is_empty()));
            if !lines.is_empty() {
                left = left.run(Run::new(format!("\n{}", lines.join("\n"))));
            }
            (left, styles.paragraph().run(Run::new(e.date.trim()).italic()))
        })
        .collect();
    if rows.is_empty() {
        return Vec::new();
    }
    vec![vec![two_column_table(rows, EDUCATION_WIDTHS)]]
}

fn publication_entries(publications: &[String], styles: &BlockStyles) -> Vec<Vec<Element>> {
    let bullets: Vec<Element> = publications
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| styles.bullet(p))
        .collect();
    if bullets.is_empty() {
        return Vec::new();
    }
    vec![bullets]
}

/// Section data drawn from the parsed source resume, used when the model
/// produced nothing.
pub fn profile_data(profile: &ResumeProfile) -> TailoredResumeData {
    let mut data = TailoredResumeData {
        summary: profile.summary.clone(),
        ..Default::default()
    };
    if !profile.skills.is_empty() {
        data.technical_skills.push(SkillCategory {
            name: DEFAULT_SKILL_CATEGORY.to_string(),
            skills: profile.skills.clone(),
        });
    }
    if !profile.experience.is_empty() {
        data.experience.push(ExperienceEntry {
            bullets: profile.experience.clone(),
            ..Default::default()
        });
    }
    data.education = profile
        .education
        .iter()
        .map(|line| EducationEntry {
            degree: line.clone(),
            ..Default::default()
        })
        .collect();
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::document::paragraph_text;

    fn styles(marker: bool) -> BlockStyles {
        BlockStyles {
            normal: "Normal".into(),
            heading: "Heading1".into(),
            title: "Title".into(),
            bullet: "ListBullet".into(),
            bullet_marker: marker,
        }
    }

    fn texts(blocks: &[Element]) -> Vec<String> {
        blocks.iter().map(paragraph_text).collect()
    }

    #[test]
    fn test_synonym_matching() {
        assert_eq!(SectionKind::Skills.match_rank("  technical skills "), Some(1));
        assert_eq!(SectionKind::Experience.match_rank("Experience"), Some(0));
        assert_eq!(SectionKind::Projects.match_rank("Experience"), None);
        // every label is its own first synonym
        for kind in SectionKind::ALL {
            assert_eq!(kind.match_rank(kind.label()), Some(0), "{kind}");
        }
    }

    #[test]
    fn test_experience_entries_are_blank_separated() {
        let data = TailoredResumeData {
            experience: vec![
                ExperienceEntry {
                    title: "ML Engineer".into(),
                    company: "Acme".into(),
                    location: "Pune".into(),
                    duration: "2021 - Present".into(),
                    bullets: vec!["Shipped models".into(), "  ".into()],
                },
                ExperienceEntry {
                    title: "Intern".into(),
                    bullets: vec!["Wrote tests".into()],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let blocks = SectionKind::Experience.blocks(&data, &styles(false));
        assert_eq!(
            texts(&blocks),
            [
                "ML Engineer • Acme • Pune\t2021 - Present",
                "Shipped models",
                "",
                "Intern",
                "Wrote tests",
            ]
        );
        assert!(blocks[0].find("w:b").is_some());
        assert_eq!(blocks[0].find("w:tab").and_then(|t| t.attr("w:pos")), Some("10080"));
    }

    #[test]
    fn test_bullet_marker_only_for_synthesized_style() {
        let data = TailoredResumeData {
            research_publications: vec!["Paper A".into(), "Paper B".into()],
            ..Default::default()
        };
        let plain = SectionKind::Publications.blocks(&data, &styles(false));
        assert_eq!(texts(&plain), ["Paper A", "Paper B"]);
        let marked = SectionKind::Publications.blocks(&data, &styles(true));
        assert_eq!(texts(&marked), ["• Paper A", "• Paper B"]);
    }

    #[test]
    fn test_skills_table_skips_empty_categories() {
        let data = TailoredResumeData {
            technical_skills: vec![
                SkillCategory {
                    name: "Languages".into(),
                    skills: vec!["Python".into(), "Rust".into()],
                },
                SkillCategory {
                    name: "Empty".into(),
                    skills: vec![],
                },
            ],
            ..Default::default()
        };
        let blocks = SectionKind::Skills.blocks(&data, &styles(false));
        assert_eq!(blocks.len(), 1);
        let table = &blocks[0];
        assert!(table.is("w:tbl"));
        assert_eq!(table.elements().filter(|e| e.is("w:tr")).count(), 1);

        let empty = TailoredResumeData::default();
        assert!(SectionKind::Skills.blocks(&empty, &styles(false)).is_empty());
        assert!(!SectionKind::Skills.has_data(&empty));
    }

    #[test]
    fn test_education_cell_lines() {
        let data = TailoredResumeData {
            education: vec![EducationEntry {
                degree: "B.Tech CSE".into(),
                institution: "IIT".into(),
                date: "2020".into(),
                details: vec!["GPA 9.1".into()],
            }],
            ..Default::default()
        };
        let blocks = SectionKind::Education.blocks(&data, &styles(false));
        let cells: Vec<String> = blocks[0]
            .find("w:tr")
            .unwrap()
            .elements()
            .filter(|e| e.is("w:tc"))
            .map(|tc| paragraph_text(tc.child("w:p").unwrap()))
            .collect();
        assert_eq!(cells, ["B.Tech CSE\nIIT\nGPA 9.1", "2020"]);
    }

    #[test]
    fn test_project_header() {
        let data = TailoredResumeData {
            projects: vec![ProjectEntry {
                name: "RAG Bot".into(),
                technologies: "Rust, SQLite".into(),
                description: vec!["Indexed docs".into()],
            }],
            ..Default::default()
        };
        let blocks = SectionKind::Projects.blocks(&data, &styles(false));
        assert_eq!(texts(&blocks), ["RAG Bot | Rust, SQLite", "Indexed docs"]);
    }

    #[test]
    fn test_profile_data_fallback() {
        let profile = ResumeProfile {
            name: "Jane Doe".into(),
            summary: "Builder of things".into(),
            skills: vec!["Python".into()],
            education: vec!["B.Sc Physics".into()],
            ..Default::default()
        };
        let data = profile_data(&profile);
        assert_eq!(data.summary, "Builder of things");
        assert_eq!(data.technical_skills[0].name, DEFAULT_SKILL_CATEGORY);
        assert_eq!(data.education[0].degree, "B.Sc Physics");
        assert!(data.experience.is_empty());
    }
}
