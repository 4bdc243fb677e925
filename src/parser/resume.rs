/// Heuristic resume profile extraction.
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{detect_skills, merge_unique, segment, strip_marker};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\+?\d[\s-]?){8,15}").unwrap());
static LINKEDIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:[a-z]{2,3}\.)?linkedin\.com/in/[A-Za-z0-9_%-]+/?").unwrap()
});
static SKILL_TOKEN_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,|;•]").unwrap());

/// Candidate details pulled out of the source resume. Empty strings and
/// vectors stand for "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub skills: Vec<String>,
    pub summary: String,
    pub experience: Vec<String>,
    pub education: Vec<String>,
    pub raw_text: String,
}

impl ResumeProfile {
    /// Name for signatures and document titles.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { "Candidate" } else { &self.name }
    }

    /// `email | phone | linkedin`, skipping what is missing.
    pub fn contact_line(&self) -> String {
        [&self.email, &self.phone, &self.linkedin]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResumeSection {
    Summary,
    Experience,
    Skills,
    Education,
}

fn classify(key: &str) -> Option<Option<ResumeSection>> {
    use ResumeSection::*;
    let section = match key {
        "SUMMARY" | "PROFESSIONAL SUMMARY" | "PROFILE" | "OBJECTIVE" | "ABOUT ME" => Some(Summary),
        "EXPERIENCE" | "WORK EXPERIENCE" | "PROFESSIONAL EXPERIENCE" | "EMPLOYMENT"
        | "EMPLOYMENT HISTORY" => Some(Experience),
        "SKILLS" | "TECHNICAL SKILLS" | "CORE SKILLS" => Some(Skills),
        "EDUCATION" | "ACADEMICS" => Some(Education),
        "PROJECTS" | "CERTIFICATIONS" | "PUBLICATIONS" | "RESEARCH & PUBLICATIONS"
        | "ACHIEVEMENTS" | "AWARDS" | "INTERESTS" | "LANGUAGES" | "HOBBIES" => None,
        _ => return None,
    };
    Some(section)
}

pub fn parse_resume(text: &str) -> ResumeProfile {
    let mut profile = ResumeProfile {
        raw_text: text.to_string(),
        ..Default::default()
    };

    if let Some(m) = EMAIL.find(text) {
        profile.email = m.as_str().to_string();
    }
    if let Some(m) = PHONE.find(text) {
        profile.phone = m.as_str().trim().to_string();
    }
    if let Some(m) = LINKEDIN.find(text) {
        profile.linkedin = m.as_str().trim_end_matches('/').to_string();
    }
    profile.name = guess_name(text, &profile.email);
    profile.skills = detect_skills(text);

    for (section, lines) in segment(text, classify) {
        match section {
            ResumeSection::Summary => {
                if profile.summary.is_empty() {
                    profile.summary = lines.join(" ");
                }
            }
            ResumeSection::Experience => {
                profile.experience.extend(lines.iter().map(|l| strip_marker(l)));
            }
            ResumeSection::Education => {
                profile.education.extend(lines.iter().map(|l| strip_marker(l)));
            }
            ResumeSection::Skills => {
                let tokens = lines.iter().flat_map(|line| {
                    let line = strip_marker(line);
                    // "Languages: Python, Rust" lists after the colon
                    let list = line.split_once(':').map_or(line.as_str(), |(_, rest)| rest).to_string();
                    SKILL_TOKEN_SPLIT
                        .split(&list)
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect::<Vec<_>>()
                });
                merge_unique(&mut profile.skills, tokens);
            }
        }
    }
    profile.experience.retain(|l| !l.is_empty());
    profile.education.retain(|l| !l.is_empty());

    debug!(
        "Parsed resume: name='{}', {} skills, {} experience lines",
        profile.name,
        profile.skills.len(),
        profile.experience.len()
    );
    profile
}

/// First of the top ten lines with two to four words that all start with a
/// letter and no email; otherwise the first line if it is short.
fn guess_name(text: &str, email: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    for line in lines.iter().take(10) {
        if !email.is_empty() && line.contains(email) {
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        if (2..=4).contains(&words.len())
            && words
                .iter()
                .all(|w| w.chars().next().is_some_and(char::is_alphabetic))
        {
            return line.to_string();
        }
    }
    match lines.first() {
        Some(first) if first.split_whitespace().count() <= 5 => first.to_string(),
        _ => String::new(),
    }
}
