/// End-to-end tests for the jobtailor pipeline.
///
/// Tests the complete flow:
///   feeds → gather (filter, dedup, persist) → tailor → render → record
use jobtailor::apply::ManualReviewApplicant;
use jobtailor::config::Config;
use jobtailor::db::Db;
use jobtailor::db::models::JobPost;
use jobtailor::docx::package::{DOCUMENT_PART, STYLES_PART};
use jobtailor::docx::{Document, DocxPackage};
use jobtailor::filter::is_location_ok;
use jobtailor::llm::{LanguageModel, MockLlm};
use jobtailor::parser::{ResumeProfile, parse_llm_response};
use jobtailor::pipeline::{Context, SearchPrefs, gather_jobs, job_slug, process_jobs};
use jobtailor::providers::configured_providers;
use jobtailor::render::plain_text::PlainText;
use jobtailor::render::{
    Ladder, RenderError, RenderStrategy, ResumeInput, Tier, resume_ladder,
};
use jobtailor::tailor::{SkillCategory, TailoredResumeData};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn heading(text: &str) -> String {
    format!(r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>{text}</w:t></w:r></w:p>"#)
}

fn para(text: &str) -> String {
    format!(r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t>{text}</w:t></w:r></w:p>"#)
}

/// A resume template with Title/Heading1 styles and the given body.
fn write_template(path: &Path, body: &str) {
    let mut pkg = DocxPackage::blank();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );
    pkg.set_part(DOCUMENT_PART, document.into_bytes());
    let styles = format!(
        r#"<w:styles xmlns:w="{W_NS}"><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/></w:style></w:styles>"#
    );
    pkg.set_part(STYLES_PART, styles.into_bytes());
    pkg.save(path).unwrap();
}

fn profile() -> ResumeProfile {
    ResumeProfile {
        name: "Jane Doe".into(),
        email: "jane@example.com".into(),
        summary: "Machine learning engineer focused on ranking systems".into(),
        skills: vec!["Python".into(), "PyTorch".into()],
        ..Default::default()
    }
}

fn test_config(root: &Path) -> Config {
    Config {
        feeds_dir: root.join("feeds").display().to_string(),
        output_dir: root.join("out").display().to_string(),
        resume_template_path: root.join("no-template.docx").display().to_string(),
        cover_letter_base_path: root.join("no-base.docx").display().to_string(),
        countries: vec!["India".into()],
        cities: vec![],
        keywords: vec!["machine learning".into(), "ml engineer".into()],
        requests_per_min: 6000,
        ..Config::default()
    }
}

/// Full pipeline: feeds → gather → process → records and files
#[test]
fn test_full_pipeline() {
    let temp_dir = tempdir().unwrap();
    let feeds = temp_dir.path().join("feeds");
    fs::create_dir_all(&feeds).unwrap();

    fs::write(
        feeds.join("linkedin.json"),
        r#"[
            {"title": "ML Engineer", "company": "Acme AI", "location": "Bengaluru, India",
             "description": "Machine learning in production", "url": "https://linkedin.example/1"},
            {"title": "Machine Learning Researcher", "company": "Far Away", "location": "Berlin, Germany",
             "description": "Research", "url": "https://linkedin.example/2"}
        ]"#,
    )
    .unwrap();
    // same job as linkedin's first, different casing: collapses
    fs::write(
        feeds.join("indeed.json"),
        r#"[
            {"title": "ml engineer", "company": "ACME AI", "location": " bengaluru, india ",
             "description": "dup", "url": "https://indeed.example/1"},
            {"title": "Machine Learning Intern", "company": "Startup", "location": "Remote",
             "description": "Summer role", "url": "https://indeed.example/2"}
        ]"#,
    )
    .unwrap();
    // wellfound feed is corrupt, internshala feed is missing: both are warnings
    fs::write(feeds.join("wellfound.json"), "{not json").unwrap();

    let config = test_config(temp_dir.path());
    let mut ctx = Context::new(
        config,
        Box::new(MockLlm::new()),
        Db::open_in_memory().unwrap(),
        Box::new(ManualReviewApplicant),
    );

    let providers = configured_providers(&ctx.config);
    assert_eq!(providers.len(), 4);
    let prefs = SearchPrefs::from_config(&ctx.config);
    let jobs = gather_jobs(&mut ctx, &providers, &prefs, None).unwrap();

    // "machine learning" runs first: indeed's intern, then linkedin's engineer.
    // indeed's "ml engineer" only matches the second keyword and is a duplicate by then.
    let titles: Vec<&str> = jobs.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(titles, ["Machine Learning Intern", "ML Engineer"]);
    assert_eq!(ctx.db.count_jobs().unwrap(), 2);
    assert_eq!(ctx.db.get_job(&jobs[0].job_id).unwrap().unwrap().source, "indeed");
    assert_eq!(ctx.db.get_job(&jobs[1].job_id).unwrap().unwrap().source, "linkedin");

    let summary = process_jobs(&ctx, &jobs, &profile(), None).unwrap();
    assert_eq!(summary.tailored, 2);
    assert_eq!(summary.failed, 0);

    for job in &jobs {
        let rec = ctx.db.get_application(&job.job_id).unwrap().unwrap();
        assert_eq!(rec.status, "prepared", "{}", job.title);
        let slug = job_slug(job);
        let out = temp_dir.path().join("out");
        let resume = Document::open(out.join(format!("{slug}_resume.docx"))).unwrap();
        let text = resume.text();
        assert!(text.starts_with("Jane Doe"), "{text}");
        assert!(text.contains("Test Company"));
        assert!(out.join(format!("{slug}_cover_letter.docx")).exists());
    }

    // second run: everything already has an application record
    let again = process_jobs(&ctx, &jobs, &profile(), None).unwrap();
    assert_eq!(again.tailored, 0);
    assert_eq!(again.skipped, 2);
}

/// Replacing SKILLS in a template leaves EDUCATION and everything after it as it was
#[test]
fn test_template_round_trip_preserves_following_sections() {
    let temp_dir = tempdir().unwrap();
    let template = temp_dir.path().join("template.docx");
    let body = [
        r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Jane Doe</w:t></w:r></w:p>"#.to_string(),
        heading("SKILLS"),
        para("Java, C++"),
        heading("EDUCATION"),
        para("B.Tech, IIT Bombay"),
        para("2019"),
    ]
    .concat();
    write_template(&template, &body);

    let original = Document::open(&template).unwrap();
    let education_start = original.find_section_heading("EDUCATION").unwrap();
    let original_tail = original.text().lines().skip(education_start).map(String::from).collect::<Vec<_>>();

    let profile = profile();
    let data = TailoredResumeData {
        technical_skills: vec![SkillCategory {
            name: "Languages".into(),
            skills: vec!["Python".into(), "Rust".into()],
        }],
        ..Default::default()
    };
    let input = ResumeInput {
        profile: &profile,
        tailored: &data,
        template: Some(&template),
    };
    let outcome = resume_ladder()
        .render(&input, &temp_dir.path().join("tailored"))
        .unwrap();
    assert_eq!(outcome.tier, Tier::TemplateMutation);
    assert!(!outcome.degraded());

    let result = Document::open(&outcome.path).unwrap();
    let text = result.text();
    assert!(text.contains("Languages\nPython, Rust"));
    assert!(!text.contains("Java"));

    let education = result.find_section_heading("EDUCATION").unwrap();
    assert_eq!(result.paragraph_text(education - 1).as_deref(), Some(""));
    let lines: Vec<String> = text.lines().map(String::from).collect();
    let tail_at = lines.iter().position(|l| l == "EDUCATION").unwrap();
    assert_eq!(lines[tail_at..], original_tail[..]);
    // italic run formatting survives the round trip
    assert!(result.blocks()[education + 1].as_element().unwrap().find("w:i").is_some());
}

/// A model completion fills a template end to end
#[test]
fn test_mock_completion_fills_template() {
    let temp_dir = tempdir().unwrap();
    let template = temp_dir.path().join("template.docx");
    write_template(
        &template,
        &[heading("PROFESSIONAL SUMMARY"), para("old"), heading("EXPERIENCE"), para("old job")].concat(),
    );
    let completion = MockLlm::new().generate("tailor", 768, 0.6).unwrap();
    let data = parse_llm_response(&completion);
    let profile = profile();
    let input = ResumeInput {
        profile: &profile,
        tailored: &data,
        template: Some(&template),
    };
    let outcome = resume_ladder().render(&input, &temp_dir.path().join("r")).unwrap();
    assert_eq!(outcome.tier, Tier::TemplateMutation);

    let text = Document::open(&outcome.path).unwrap().text();
    assert!(!text.contains("old"));
    assert!(text.contains("Software Engineer • Test Company • Remote\t2020 - Present"));
    // sections missing from the template are appended
    for heading in ["PROJECTS", "SKILLS", "EDUCATION", "RESEARCH PUBLICATIONS"] {
        assert!(text.lines().any(|l| l == heading), "missing {heading}");
    }
}

/// Failing template → scratch document with name and tailored summary
#[test]
fn test_corrupt_template_degrades_to_scratch() {
    let temp_dir = tempdir().unwrap();
    let template = temp_dir.path().join("broken.docx");
    fs::write(&template, b"PK\x03\x04 truncated").unwrap();

    let profile = profile();
    let data = TailoredResumeData {
        summary: "Ranking engineer tailored for Acme".into(),
        ..Default::default()
    };
    let input = ResumeInput {
        profile: &profile,
        tailored: &data,
        template: Some(&template),
    };
    let outcome = resume_ladder().render(&input, &temp_dir.path().join("r")).unwrap();
    assert_eq!(outcome.tier, Tier::ScratchBuild);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].tier, Tier::TemplateMutation);
    // the template was opened and rejected, not skipped for lack of content
    assert!(
        outcome.failures[0].reason.starts_with("zip error"),
        "{}",
        outcome.failures[0].reason
    );

    let text = Document::open(&outcome.path).unwrap().text();
    assert!(text.contains("Jane Doe"));
    assert!(text.contains("SUMMARY\nRanking engineer tailored for Acme"));
    assert!(!text.contains("Machine learning engineer focused on ranking systems"));
}

struct Unwritable(Tier);

impl<'a> RenderStrategy<ResumeInput<'a>> for Unwritable {
    fn tier(&self) -> Tier {
        self.0
    }

    fn render(&self, _input: &ResumeInput<'a>, _output: &Path) -> Result<PathBuf, RenderError> {
        Err(RenderError::Io(std::io::Error::other("disk full")))
    }
}

/// Failing scratch build → plain text with name and summary
#[test]
fn test_failing_docx_tiers_degrade_to_plain_text() {
    let temp_dir = tempdir().unwrap();
    let profile = profile();
    let data = TailoredResumeData::default();
    let input = ResumeInput {
        profile: &profile,
        tailored: &data,
        template: None,
    };
    let ladder: Ladder<ResumeInput<'_>> = Ladder::new(vec![
        Box::new(Unwritable(Tier::TemplateMutation)),
        Box::new(Unwritable(Tier::ScratchBuild)),
        Box::new(PlainText),
    ]);
    let outcome = ladder.render(&input, &temp_dir.path().join("r")).unwrap();
    assert_eq!(outcome.tier, Tier::PlainText);
    assert_eq!(outcome.failures.len(), 2);
    assert!(outcome.failures[1].reason.contains("disk full"));

    let text = fs::read_to_string(&outcome.path).unwrap();
    assert!(text.starts_with("Jane Doe\n"));
    assert!(text.contains("Machine learning engineer focused on ranking systems"));
}

/// The reference listing is accepted and keyed deterministically
#[test]
fn test_reference_listing() {
    let job = JobPost::new(
        "Senior Software Engineer",
        "Tech Innovations Inc.",
        "San Francisco, CA (Hybrid)",
        "",
        "https://example.com/job",
        "linkedin",
    );
    assert!(is_location_ok(&job.location, &["San Francisco".to_string()], &[], true, false));
    assert_eq!(
        job.job_id,
        "ab8e7502f68183e4da1898adaed26a96225f316ba622ddc8a311d0cd74bdf17a"
    );
}
