/// Per-job tailored resume content.
///
/// [`TailoredResumeData`] is produced by [`crate::parser::response`] from a
/// model completion and consumed by the renderers in [`crate::render`]. Every
/// field is always present; "no content" is an empty string or vector.
pub mod prompts;
pub mod service;

use serde::{Deserialize, Serialize};

pub use service::{TailorService, TailoredDocuments};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub location: String,
    pub duration: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub technologies: String,
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub name: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub date: String,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailoredResumeData {
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    /// Categories in the order the model listed them.
    pub technical_skills: Vec<SkillCategory>,
    pub education: Vec<EducationEntry>,
    pub research_publications: Vec<String>,
}

impl TailoredResumeData {
    /// True when the model produced nothing usable for any section.
    pub fn is_empty(&self) -> bool {
        self.summary.trim().is_empty()
            && self.experience.is_empty()
            && self.projects.is_empty()
            && self.technical_skills.iter().all(|c| c.skills.is_empty())
            && self.education.is_empty()
            && self.research_publications.is_empty()
    }

    pub fn skill_count(&self) -> usize {
        self.technical_skills.iter().map(|c| c.skills.len()).sum()
    }
}
