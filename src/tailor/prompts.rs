/// Prompt builders for the tailoring and cover-letter completions.
use crate::parser::{ParsedJob, ResumeProfile};

pub const TAILOR_MAX_TOKENS: u32 = 768;
pub const COVER_LETTER_MAX_TOKENS: u32 = 600;

const TAILOR_TEMPLATE: &str = "\
You are an expert resume writer. Tailor the resume below to the job description. \
Use only information present in the resume: do not invent skills, roles or results.

Resume:
---
{resume}
---

Job: {title} at {company} ({location})
---
{job}
---

Answer in exactly this format:

## SUMMARY
<two or three sentences>

## PROFESSIONAL EXPERIENCE
### Title | Company | Location | Dates
- <bullet>

## PROJECTS
### Project name
Technologies: <comma separated>
- <bullet>

## TECHNICAL_SKILLS
### Category
- skill, skill, skill

## EDUCATION
Degree | Institution | Dates

## RESEARCH_PUBLICATIONS
- <publication>
";

const COVER_LETTER_TEMPLATE: &str = "\
Write a personalized cover letter body (250-350 words) for the job below.

Job: {title} at {company} ({location})
URL: {url}

Candidate: {name}
Email: {email}
Phone: {phone}

Base cover letter (optional):
{base}

Job description:
{job}

Structure: an opening paragraph on the role and company, one paragraph with the two or three \
most relevant achievements, one on fit with the company, and a closing call to action. \
Output only the body paragraphs separated by blank lines, with no greeting or signature.
";

fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{key}}}"), value)
    })
}

pub fn tailor_prompt(profile: &ResumeProfile, job: &ParsedJob) -> String {
    fill(
        TAILOR_TEMPLATE,
        &[
            ("resume", profile.raw_text.trim()),
            ("title", &job.title),
            ("company", &job.company),
            ("location", &job.location),
            ("job", job.description.trim()),
        ],
    )
}

pub fn cover_letter_prompt(
    profile: &ResumeProfile,
    job: &ParsedJob,
    url: &str,
    base_text: &str,
) -> String {
    fill(
        COVER_LETTER_TEMPLATE,
        &[
            ("title", &job.title),
            ("company", &job.company),
            ("location", &job.location),
            ("url", url),
            ("name", &profile.name),
            ("email", &profile.email),
            ("phone", &profile.phone),
            ("base", base_text.trim()),
            ("job", job.description.trim()),
        ],
    )
}
