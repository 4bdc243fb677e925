/// Job description segmentation.
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{detect_skills, merge_unique, segment, strip_marker};
use crate::db::models::JobPost;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub responsibilities: Vec<String>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobSection {
    Requirements,
    Responsibilities,
    Skills,
}

fn classify(key: &str) -> Option<Option<JobSection>> {
    use JobSection::*;
    let section = match key {
        "REQUIREMENTS" | "QUALIFICATIONS" | "MINIMUM QUALIFICATIONS" | "PREFERRED QUALIFICATIONS"
        | "WHAT WE'RE LOOKING FOR" | "WHAT WE ARE LOOKING FOR" | "WHO YOU ARE" | "MUST HAVE"
        | "NICE TO HAVE" => Some(Requirements),
        "RESPONSIBILITIES" | "KEY RESPONSIBILITIES" | "WHAT YOU'LL DO" | "WHAT YOU WILL DO"
        | "THE ROLE" | "ROLE" | "DUTIES" | "YOUR ROLE" => Some(Responsibilities),
        "SKILLS" | "REQUIRED SKILLS" | "TECH STACK" | "TECHNOLOGIES" | "TOOLS" => Some(Skills),
        "ABOUT US" | "ABOUT THE COMPANY" | "BENEFITS" | "PERKS" | "WHY JOIN US" | "COMPENSATION" => {
            None
        }
        _ => return None,
    };
    Some(section)
}

pub fn parse_job(post: &JobPost) -> ParsedJob {
    let mut job = ParsedJob {
        title: post.title.clone(),
        company: post.company.clone(),
        location: post.location.clone(),
        description: post.description.clone(),
        skills: detect_skills(&post.description),
        ..Default::default()
    };

    for (section, lines) in segment(&post.description, classify) {
        let items = lines.iter().map(|l| strip_marker(l)).filter(|l| !l.is_empty());
        match section {
            JobSection::Requirements => job.requirements.extend(items),
            JobSection::Responsibilities => job.responsibilities.extend(items),
            JobSection::Skills => {
                let tokens: Vec<String> = items
                    .flat_map(|l| {
                        l.split([',', '|', ';'])
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect::<Vec<_>>()
                    })
                    .collect();
                merge_unique(&mut job.skills, tokens);
            }
        }
    }

    debug!(
        "Parsed job '{}': {} requirements, {} responsibilities, {} skills",
        job.title,
        job.requirements.len(),
        job.responsibilities.len(),
        job.skills.len()
    );
    job
}
