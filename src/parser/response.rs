/// Turns a free-text model completion into [`TailoredResumeData`].
///
/// The completion is expected to use `## SECTION` headers. Each section has an
/// ordered list of header variants; the first variant whose body is non-empty
/// wins. Markers need not start a line: models often open with chatter
/// (`Sure! ## SUMMARY ...`) or put a whole answer on one line. A body runs
/// until the next `##` that is not part of a `###` entry header. Nothing here
/// fails: missing or garbled sections simply stay empty.
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::tailor::{
    EducationEntry, ExperienceEntry, ProjectEntry, SkillCategory, TailoredResumeData,
};

const SUMMARY_HEADERS: &[&str] = &["SUMMARY", "PROFESSIONAL SUMMARY"];
const EXPERIENCE_HEADERS: &[&str] = &["PROFESSIONAL EXPERIENCE", "EXPERIENCE", "WORK EXPERIENCE"];
const PROJECTS_HEADERS: &[&str] = &["PROJECTS", "PERSONAL PROJECTS"];
const SKILLS_HEADERS: &[&str] = &["TECHNICAL SKILLS", "SKILLS"];
const EDUCATION_HEADERS: &[&str] = &["EDUCATION"];
const PUBLICATIONS_HEADERS: &[&str] = &[
    "RESEARCH PUBLICATIONS",
    "RESEARCH & PUBLICATIONS",
    "PUBLICATIONS",
];

/// Bucket used when skills come without categories.
pub const DEFAULT_SKILL_CATEGORY: &str = "Technical Skills";

/// Group 1 is the `##` opening the next section.
static SECTION_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(?:^|[^#])(##)(?:[^#]|$)").unwrap());
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-•*▪◦‣]|\d{1,2}[.)])\s*(.*)$").unwrap());
static RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-*_=]{3,}$").unwrap());
static TECH_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:technologies|tech stack|stack|tools|built with)\s*:\s*(.+)$").unwrap()
});
static SKILL_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,|;]").unwrap());

/// Header regex for one label: `## LABEL` anywhere but never inside `###`,
/// case-insensitive, spaces or underscores between words. A closing `##` is
/// consumed only when it ends the line, so it cannot eat the next marker.
fn header_pattern(label: &str) -> Regex {
    let words: Vec<String> = label.split_whitespace().map(regex::escape).collect();
    let label = words.join(r"[ \t_]+");
    Regex::new(&format!(
        r"(?im)(?:^|[^#])##[ \t]*\**[ \t]*{label}\b\**(?:[ \t]*##[ \t]*:?[ \t]*$|[ \t]*:?)"
    ))
    .unwrap()
}

fn compile(labels: &[&str]) -> Vec<Regex> {
    labels.iter().map(|l| header_pattern(l)).collect()
}

static SUMMARY: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(SUMMARY_HEADERS));
static EXPERIENCE: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(EXPERIENCE_HEADERS));
static PROJECTS: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(PROJECTS_HEADERS));
static SKILLS: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(SKILLS_HEADERS));
static EDUCATION: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(EDUCATION_HEADERS));
static PUBLICATIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(PUBLICATIONS_HEADERS));

/// Parse every section of a completion.
pub fn parse_llm_response(response: &str) -> TailoredResumeData {
    let mut data = TailoredResumeData::default();
    if response.trim().is_empty() {
        warn!("Empty LLM response, nothing to parse");
        return data;
    }

    if let Some(body) = section_body(response, &SUMMARY, "summary") {
        data.summary = join_lines(body);
    }
    if let Some(body) = section_body(response, &EXPERIENCE, "experience") {
        data.experience = parse_experience(body);
    }
    if let Some(body) = section_body(response, &PROJECTS, "projects") {
        data.projects = parse_projects(body);
    }
    if let Some(body) = section_body(response, &SKILLS, "skills") {
        data.technical_skills = parse_skills(body);
    }
    if let Some(body) = section_body(response, &EDUCATION, "education") {
        data.education = parse_education(body);
    }
    if let Some(body) = section_body(response, &PUBLICATIONS, "publications") {
        data.research_publications = parse_list(body);
    }

    info!(
        "Parsed LLM response: {} experience, {} projects, {} skills in {} categories, {} education, {} publications",
        data.experience.len(),
        data.projects.len(),
        data.skill_count(),
        data.technical_skills.len(),
        data.education.len(),
        data.research_publications.len()
    );
    data
}

/// Body of the first header variant that has non-empty content.
fn section_body<'a>(text: &'a str, patterns: &[Regex], section: &str) -> Option<&'a str> {
    for pattern in patterns {
        let Some(header) = pattern.find(text) else {
            continue;
        };
        let rest = &text[header.end()..];
        let end = SECTION_END
            .captures(rest)
            .and_then(|c| c.get(1))
            .map_or(rest.len(), |m| m.start());
        let body = rest[..end].trim();
        if !body.is_empty() {
            return Some(body);
        }
        debug!("Empty {} section under header '{}'", section, header.as_str().trim());
    }
    debug!("No {} section in LLM response", section);
    None
}

// ── Line helpers ──────────────────────────────────────────────────

fn clean(s: &str) -> String {
    s.trim().trim_matches('*').trim().to_string()
}

fn join_lines(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text after a bullet marker, or `None` when the line is not a bullet.
fn bullet_text(line: &str) -> Option<String> {
    let line = line.trim();
    // **bold** lines are emphasis, not bullets
    if line.starts_with("**") || RULE.is_match(line) {
        return None;
    }
    BULLET.captures(line).map(|caps| clean(&caps[1]))
}

fn strip_bullet(line: &str) -> String {
    bullet_text(line).unwrap_or_else(|| clean(line))
}

fn pipe_fields(line: &str) -> Vec<String> {
    line.split('|').map(clean).collect()
}

fn push_or_continue(items: &mut Vec<String>, line: &str) {
    match bullet_text(line) {
        Some(text) if !text.is_empty() => items.push(text),
        Some(_) => {}
        None => match items.last_mut() {
            Some(last) => {
                last.push(' ');
                last.push_str(&clean(line));
            }
            None => items.push(clean(line)),
        },
    }
}

/// `###` blocks as `(header, lines)`. Without any `###`, blank-line
/// separated blocks are used and their first line is the header.
fn split_entries(body: &str) -> Vec<(String, Vec<String>)> {
    let mut entries: Vec<(String, Vec<String>)> = Vec::new();

    if body.lines().any(|l| l.trim_start().starts_with("###")) {
        for line in body.lines() {
            let trimmed = line.trim();
            if let Some(header) = trimmed.strip_prefix("###") {
                entries.push((clean(header.trim_start_matches('#')), Vec::new()));
            } else if let Some((_, lines)) = entries.last_mut() {
                if !trimmed.is_empty() && !RULE.is_match(trimmed) {
                    lines.push(trimmed.to_string());
                }
            }
        }
        return entries;
    }

    for block in blocks(body) {
        let mut lines = block.into_iter();
        if let Some(first) = lines.next() {
            entries.push((strip_bullet(&first), lines.collect()));
        }
    }
    entries
}

/// Blank-line separated groups of trimmed, non-empty lines.
fn blocks(body: &str) -> Vec<Vec<String>> {
    let mut out: Vec<Vec<String>> = vec![Vec::new()];
    for line in body.lines().map(str::trim) {
        if line.is_empty() || RULE.is_match(line) {
            if out.last().is_some_and(|b| !b.is_empty()) {
                out.push(Vec::new());
            }
        } else if let Some(block) = out.last_mut() {
            block.push(line.to_string());
        }
    }
    out.retain(|b| !b.is_empty());
    out
}

// ── Section parsers ───────────────────────────────────────────────

fn parse_experience(body: &str) -> Vec<ExperienceEntry> {
    let mut out = Vec::new();
    for (header, lines) in split_entries(body) {
        let mut entry = ExperienceEntry::default();
        let fields = pipe_fields(&header);
        match fields.as_slice() {
            [title] => entry.title = title.clone(),
            [title, company] => {
                entry.title = title.clone();
                entry.company = company.clone();
            }
            [title, company, duration] => {
                entry.title = title.clone();
                entry.company = company.clone();
                entry.duration = duration.clone();
            }
            [title, company, location, rest @ ..] => {
                entry.title = title.clone();
                entry.company = company.clone();
                entry.location = location.clone();
                entry.duration = rest.join(" | ");
            }
            [] => {}
        }

        let mut has_company = !entry.company.is_empty();
        for line in &lines {
            if !has_company && entry.bullets.is_empty() && bullet_text(line).is_none() && line.contains('|') {
                // "Company | Location | Dates" line under a bare title
                match pipe_fields(line).as_slice() {
                    [company] => entry.company = company.clone(),
                    [company, dates] => {
                        entry.company = company.clone();
                        entry.duration = dates.clone();
                    }
                    [company, location, rest @ ..] => {
                        entry.company = company.clone();
                        entry.location = location.clone();
                        entry.duration = rest.join(" | ");
                    }
                    [] => {}
                }
                has_company = true;
                continue;
            }
            push_or_continue(&mut entry.bullets, line);
        }

        if entry.title.is_empty() && entry.company.is_empty() && entry.bullets.is_empty() {
            continue;
        }
        debug!(
            "Experience entry '{}' at '{}' with {} bullets",
            entry.title,
            entry.company,
            entry.bullets.len()
        );
        out.push(entry);
    }
    out
}

fn parse_projects(body: &str) -> Vec<ProjectEntry> {
    let mut out = Vec::new();
    for (header, lines) in split_entries(body) {
        let mut entry = ProjectEntry::default();
        let mut fields = pipe_fields(&header).into_iter();
        entry.name = fields.next().unwrap_or_default();
        let tech: Vec<String> = fields.filter(|f| !f.is_empty()).collect();
        entry.technologies = tech.join(", ");

        for line in &lines {
            let text = strip_bullet(line);
            if let Some(caps) = TECH_LINE.captures(&text) {
                entry.technologies = clean(&caps[1]);
                continue;
            }
            push_or_continue(&mut entry.description, line);
        }

        if entry.name.is_empty() && entry.description.is_empty() {
            continue;
        }
        out.push(entry);
    }
    out
}

fn split_skills(line: &str) -> Vec<String> {
    SKILL_SPLIT
        .split(line)
        .map(clean)
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .collect()
}

fn add_skills(categories: &mut Vec<SkillCategory>, name: &str, skills: Vec<String>) {
    if skills.is_empty() {
        return;
    }
    match categories.iter_mut().find(|c| c.name == name) {
        Some(cat) => cat.skills.extend(skills),
        None => categories.push(SkillCategory {
            name: name.to_string(),
            skills,
        }),
    }
}

/// `"Languages: Python, Rust"` as `("Languages", "Python, Rust")`.
fn labelled(line: &str) -> Option<(String, String)> {
    let (label, rest) = line.split_once(':')?;
    let label = clean(label);
    let rest = rest.trim();
    if label.is_empty() || rest.is_empty() || SKILL_SPLIT.is_match(&label) {
        return None;
    }
    Some((label, rest.to_string()))
}

fn looks_like_category(line: &str) -> bool {
    let text = strip_bullet(line);
    let text = text.trim_end_matches(':');
    !text.is_empty() && text.len() <= 40 && !SKILL_SPLIT.is_match(text)
}

fn parse_skills(body: &str) -> Vec<SkillCategory> {
    let mut categories: Vec<SkillCategory> = Vec::new();

    if body.lines().any(|l| l.trim_start().starts_with("###")) {
        for (header, lines) in split_entries(body) {
            let name = header.trim_end_matches(':').trim().to_string();
            let skills = lines.iter().flat_map(|l| split_skills(&strip_bullet(l))).collect();
            add_skills(&mut categories, &name, skills);
        }
    } else {
        let mut leftover = Vec::new();
        for block in blocks(body) {
            let mut lines = block.iter();
            if block.len() >= 2 && labelled(&strip_bullet(&block[0])).is_none() && looks_like_category(&block[0]) {
                let name = strip_bullet(&block[0]).trim_end_matches(':').trim().to_string();
                lines.next();
                let skills = lines.flat_map(|l| split_skills(&strip_bullet(l))).collect();
                add_skills(&mut categories, &name, skills);
                continue;
            }
            for line in lines {
                let text = strip_bullet(line);
                match labelled(&text) {
                    Some((name, rest)) => add_skills(&mut categories, &name, split_skills(&rest)),
                    None => leftover.extend(split_skills(&text)),
                }
            }
        }
        add_skills(&mut categories, DEFAULT_SKILL_CATEGORY, leftover);
    }

    categories.retain(|c| !c.skills.is_empty());
    if categories.is_empty() {
        warn!("Skills section present but no skills could be extracted");
    }
    categories
}

fn parse_education(body: &str) -> Vec<EducationEntry> {
    let mut out: Vec<EducationEntry> = Vec::new();

    let from_fields = |fields: &[String]| {
        let mut entry = EducationEntry::default();
        let mut it = fields.iter().cloned();
        entry.degree = it.next().unwrap_or_default();
        entry.institution = it.next().unwrap_or_default();
        let rest: Vec<String> = it.filter(|f| !f.is_empty()).collect();
        entry.date = rest.join(" | ");
        entry
    };

    if body.lines().any(|l| l.trim_start().starts_with("###")) {
        for (header, lines) in split_entries(body) {
            let mut entry = from_fields(&pipe_fields(&header));
            for line in &lines {
                if entry.institution.is_empty() && bullet_text(line).is_none() {
                    let fields = pipe_fields(line);
                    entry.institution = fields[0].clone();
                    if entry.date.is_empty() {
                        entry.date = fields[1..].join(" | ");
                    }
                    continue;
                }
                push_or_continue(&mut entry.details, line);
            }
            if !entry.degree.is_empty() || !entry.institution.is_empty() {
                out.push(entry);
            }
        }
        return out;
    }

    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match (bullet_text(line), out.last_mut()) {
            // indented detail under an existing degree
            (Some(text), Some(prev)) if !text.contains('|') => prev.details.push(text),
            _ => {
                let entry = from_fields(&pipe_fields(&strip_bullet(line)));
                if !entry.degree.is_empty() {
                    out.push(entry);
                }
            }
        }
    }
    out
}

fn parse_list(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !RULE.is_match(l))
        .map(strip_bullet)
        .filter(|l| !l.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "\
Here is the tailored resume.

## SUMMARY
Machine learning engineer with five years
of production experience.

## PROFESSIONAL EXPERIENCE
### Senior ML Engineer | Acme Corp | Bangalore | 2021 - Present
- Built a ranking model serving
  10M requests per day
- Cut inference cost by 40%
### Data Scientist | Initech | 2018 - 2021
1. Shipped churn model
2) Led A/B tests

## PROJECTS
### Resume Tailor | Rust, SQLite
- Generates per-job resumes
Technologies: Rust, SQLite, llama.cpp

## TECHNICAL_SKILLS ##
### Languages
Python, Rust | SQL
### ML
- PyTorch; scikit-learn

## EDUCATION
B.Tech Computer Science | IIT Delhi | 2018
- GPA 9.1

## RESEARCH_PUBLICATIONS
- Efficient Ranking at Scale, KDD 2022
";

    #[test]
    fn test_full_response() {
        let data = parse_llm_response(FULL);
        assert_eq!(
            data.summary,
            "Machine learning engineer with five years of production experience."
        );

        assert_eq!(data.experience.len(), 2);
        let first = &data.experience[0];
        assert_eq!(first.title, "Senior ML Engineer");
        assert_eq!(first.company, "Acme Corp");
        assert_eq!(first.location, "Bangalore");
        assert_eq!(first.duration, "2021 - Present");
        assert_eq!(
            first.bullets,
            [
                "Built a ranking model serving 10M requests per day",
                "Cut inference cost by 40%"
            ]
        );
        let second = &data.experience[1];
        assert_eq!(second.duration, "2018 - 2021");
        assert_eq!(second.location, "");
        assert_eq!(second.bullets, ["Shipped churn model", "Led A/B tests"]);

        assert_eq!(data.projects.len(), 1);
        assert_eq!(data.projects[0].name, "Resume Tailor");
        assert_eq!(data.projects[0].technologies, "Rust, SQLite, llama.cpp");
        assert_eq!(data.projects[0].description, ["Generates per-job resumes"]);

        assert_eq!(data.technical_skills.len(), 2);
        assert_eq!(data.technical_skills[0].name, "Languages");
        assert_eq!(data.technical_skills[0].skills, ["Python", "Rust", "SQL"]);
        assert_eq!(data.technical_skills[1].skills, ["PyTorch", "scikit-learn"]);

        assert_eq!(data.education.len(), 1);
        assert_eq!(data.education[0].degree, "B.Tech Computer Science");
        assert_eq!(data.education[0].institution, "IIT Delhi");
        assert_eq!(data.education[0].date, "2018");
        assert_eq!(data.education[0].details, ["GPA 9.1"]);

        assert_eq!(
            data.research_publications,
            ["Efficient Ranking at Scale, KDD 2022"]
        );
        assert!(!data.is_empty());
    }

    #[test]
    fn test_degenerate_inputs_never_panic() {
        for input in [
            "",
            "   \n\n",
            "no markers at all, just prose",
            "##",
            "## ",
            "###",
            "## EXPERIENCE\n###",
            "## EXPERIENCE\n### | | |",
            "## SKILLS\n:",
            "## EDUCATION\n### \n|",
            "## PROJECTS\n### Tool |",
            "## SUMMARY\nTruncated mid-sent",
            "## EXPERIENCE\n### Engineer | Co",
            "## experience\n### 名前 | 会社 | 2020\n- 箇条書き",
        ] {
            let _ = parse_llm_response(input);
        }
        assert!(parse_llm_response("no markers at all").is_empty());
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let data = parse_llm_response("## summary\nShort.\n## Skills:\nGo, Rust");
        assert_eq!(data.summary, "Short.");
        assert_eq!(data.technical_skills[0].name, DEFAULT_SKILL_CATEGORY);
        assert_eq!(data.technical_skills[0].skills, ["Go", "Rust"]);
    }

    #[test]
    fn test_first_non_empty_variant_wins() {
        let text = "## PROFESSIONAL EXPERIENCE\n\n## EXPERIENCE\n### Engineer | Co | 2020\n- Did things";
        let data = parse_llm_response(text);
        assert_eq!(data.experience.len(), 1);
        assert_eq!(data.experience[0].company, "Co");
    }

    #[test]
    fn test_similar_header_does_not_match() {
        let data = parse_llm_response("## SUMMARYISH\ntext");
        assert!(data.summary.is_empty());
    }

    #[test]
    fn test_markers_mid_line() {
        for text in [
            "Sure! ## SUMMARY\nGreat engineer.\n## SKILLS\nRust, Go",
            "## SUMMARY Great engineer. ## SKILLS Rust, Go",
        ] {
            let data = parse_llm_response(text);
            assert_eq!(data.summary, "Great engineer.", "{text}");
            assert_eq!(data.technical_skills.len(), 1, "{text}");
            assert_eq!(data.technical_skills[0].skills, ["Rust", "Go"], "{text}");
        }

        let inline = "Here you go: ## EXPERIENCE\n### Engineer | Co | 2020\n- Shipped it ## EDUCATION\nBSc | Uni | 2019";
        let data = parse_llm_response(inline);
        assert_eq!(data.experience.len(), 1);
        assert_eq!(data.experience[0].bullets, ["Shipped it"]);
        assert_eq!(data.education[0].institution, "Uni");
    }

    #[test]
    fn test_closing_marker_does_not_eat_next_section() {
        let data = parse_llm_response("## SUMMARY ## SKILLS Rust");
        assert!(data.summary.is_empty());
        assert_eq!(data.technical_skills[0].skills, ["Rust"]);
    }

    #[test]
    fn test_degraded_experience_headers() {
        let text = "## EXPERIENCE\n### ML Engineer\nAcme | Remote | 2020 - 2022\n- Trained models\n### Intern | Globex\nWrote scripts";
        let data = parse_llm_response(text);
        assert_eq!(data.experience.len(), 2);
        let a = &data.experience[0];
        assert_eq!(
            (a.title.as_str(), a.company.as_str(), a.location.as_str(), a.duration.as_str()),
            ("ML Engineer", "Acme", "Remote", "2020 - 2022")
        );
        assert_eq!(a.bullets, ["Trained models"]);
        let b = &data.experience[1];
        assert_eq!((b.title.as_str(), b.company.as_str()), ("Intern", "Globex"));
        assert_eq!(b.duration, "");
        assert_eq!(b.bullets, ["Wrote scripts"]);
    }

    #[test]
    fn test_skills_blank_line_blocks() {
        let text = "## SKILLS\nProgramming Languages\nPython, Rust\n\nFrameworks:\nPyTorch | FastAPI\n";
        let cats = parse_llm_response(text).technical_skills;
        assert_eq!(cats.len(), 2);
        assert_eq!(cats[0].name, "Programming Languages");
        assert_eq!(cats[1].name, "Frameworks");
        assert_eq!(cats[1].skills, ["PyTorch", "FastAPI"]);
    }

    #[test]
    fn test_skills_labelled_lines() {
        let text = "## TECHNICAL SKILLS\n- Languages: Python, C++\n- Cloud: AWS; GCP\n";
        let cats = parse_llm_response(text).technical_skills;
        assert_eq!(cats.len(), 2);
        assert_eq!(cats[0].skills, ["Python", "C++"]);
        assert_eq!(cats[1].name, "Cloud");
    }

    #[test]
    fn test_skills_fall_back_to_single_bucket() {
        let text = "## TECHNICAL_SKILLS\n- Python, SQL\n- Docker\n";
        let cats = parse_llm_response(text).technical_skills;
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].name, DEFAULT_SKILL_CATEGORY);
        assert_eq!(cats[0].skills, ["Python", "SQL", "Docker"]);
    }

    #[test]
    fn test_education_blocks_with_sub_header() {
        let text = "## EDUCATION\n### M.S. Statistics\nStanford University | 2016\n- Thesis on Bayesian methods";
        let edu = parse_llm_response(text).education;
        assert_eq!(edu.len(), 1);
        assert_eq!(edu[0].institution, "Stanford University");
        assert_eq!(edu[0].date, "2016");
        assert_eq!(edu[0].details, ["Thesis on Bayesian methods"]);
    }

    #[test]
    fn test_projects_without_sub_headers_use_blocks() {
        let text = "## PROJECTS\nChatbot | Python\n- Answers FAQs\n\nScraper\n- Crawls job boards";
        let projects = parse_llm_response(text).projects;
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].technologies, "Python");
        assert_eq!(projects[1].name, "Scraper");
        assert_eq!(projects[1].description, ["Crawls job boards"]);
    }

    #[test]
    fn test_bullet_markers() {
        assert_eq!(bullet_text("- a").as_deref(), Some("a"));
        assert_eq!(bullet_text("• b").as_deref(), Some("b"));
        assert_eq!(bullet_text("* c").as_deref(), Some("c"));
        assert_eq!(bullet_text("12. d").as_deref(), Some("d"));
        assert_eq!(bullet_text("**Bold** text"), None);
        assert_eq!(bullet_text("---"), None);
        assert_eq!(bullet_text("plain"), None);
    }
}
