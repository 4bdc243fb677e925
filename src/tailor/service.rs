/// Per-job resume and cover letter generation.
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info, warn};

use super::TailoredResumeData;
use super::prompts::{
    COVER_LETTER_MAX_TOKENS, TAILOR_MAX_TOKENS, cover_letter_prompt, tailor_prompt,
};
use crate::config::Config;
use crate::db::models::JobPost;
use crate::llm::{DEFAULT_TEMPERATURE, LanguageModel};
use crate::parser::{ParsedJob, ResumeProfile, extract_text, parse_job, parse_llm_response};
use crate::render::cover_letter::{
    CoverLetter, body_from_completion, cover_letter_ladder, heuristic_body,
};
use crate::render::{RenderError, RenderOutcome, ResumeInput, resume_ladder};

/// Files written for one job.
#[derive(Debug, Clone)]
pub struct TailoredDocuments {
    pub resume: RenderOutcome,
    pub cover_letter: RenderOutcome,
    pub data: TailoredResumeData,
}

pub struct TailorService<'a> {
    llm: &'a dyn LanguageModel,
    output_dir: PathBuf,
    template: Option<PathBuf>,
    base_letter: String,
}

impl<'a> TailorService<'a> {
    pub fn new(
        llm: &'a dyn LanguageModel,
        output_dir: impl Into<PathBuf>,
        template: Option<PathBuf>,
        base_letter: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            output_dir: output_dir.into(),
            template,
            base_letter: base_letter.into(),
        }
    }

    /// Template and base letter come from the configured paths.
    pub fn from_config(llm: &'a dyn LanguageModel, config: &Config) -> Self {
        let base_path = Path::new(&config.cover_letter_base_path);
        let base_letter = if base_path.exists() {
            extract_text(base_path)
        } else {
            debug!("No base cover letter at {}", base_path.display());
            String::new()
        };
        let template = config.template_path();
        match &template {
            Some(t) => info!("Resume template: {}", t.display()),
            None => info!("No resume template; resumes are built from scratch"),
        }
        Self::new(llm, &config.output_dir, template, base_letter)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Ask the model for tailored sections. A failed call yields empty data,
    /// which sends rendering down to the profile-based tiers.
    pub fn tailor_resume_data(&self, profile: &ResumeProfile, job: &ParsedJob) -> TailoredResumeData {
        let prompt = tailor_prompt(profile, job);
        match self.llm.generate(&prompt, TAILOR_MAX_TOKENS, DEFAULT_TEMPERATURE) {
            Ok(text) => {
                let data = parse_llm_response(&text);
                if data.is_empty() {
                    warn!("{} returned no usable resume sections", self.llm.name());
                }
                data
            }
            Err(e) => {
                warn!("Tailoring call to {} failed: {}", self.llm.name(), e);
                TailoredResumeData::default()
            }
        }
    }

    /// Model-written body, or the heuristic body when the model fails.
    pub fn cover_letter_body(&self, profile: &ResumeProfile, job: &ParsedJob, url: &str) -> Vec<String> {
        let prompt = cover_letter_prompt(profile, job, url, &self.base_letter);
        let body = match self.llm.generate(&prompt, COVER_LETTER_MAX_TOKENS, DEFAULT_TEMPERATURE) {
            Ok(text) => body_from_completion(&text),
            Err(e) => {
                warn!("Cover letter call to {} failed: {}", self.llm.name(), e);
                Vec::new()
            }
        };
        if body.is_empty() {
            debug!("Using heuristic cover letter body");
            return heuristic_body(profile, job);
        }
        body
    }

    /// Write `{slug}_resume.*` and `{slug}_cover_letter.*` into the output
    /// directory.
    pub fn generate(
        &self,
        profile: &ResumeProfile,
        post: &JobPost,
        slug: &str,
    ) -> Result<TailoredDocuments, RenderError> {
        let job = parse_job(post);
        let data = self.tailor_resume_data(profile, &job);

        let input = ResumeInput {
            profile,
            tailored: &data,
            template: self.template.as_deref(),
        };
        let resume = resume_ladder().render(&input, &self.output_dir.join(format!("{slug}_resume")))?;

        let body = self.cover_letter_body(profile, &job, &post.url);
        let letter = CoverLetter::new(profile, &job, body, Local::now().date_naive());
        let cover_letter = cover_letter_ladder()
            .render(&letter, &self.output_dir.join(format!("{slug}_cover_letter")))?;

        Ok(TailoredDocuments {
            resume,
            cover_letter,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, MockLlm};
    use crate::render::Tier;

    struct Offline;

    impl LanguageModel for Offline {
        fn generate(&self, _p: &str, _m: u32, _t: f32) -> Result<String, LlmError> {
            Err(LlmError::Request("connection refused".into()))
        }

        fn name(&self) -> &str {
            "offline"
        }
    }

    fn profile() -> ResumeProfile {
        ResumeProfile {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            summary: "Data scientist".into(),
            skills: vec!["Python".into()],
            raw_text: "Jane Doe\nData scientist".into(),
            ..Default::default()
        }
    }

    fn post() -> JobPost {
        JobPost::new("ML Engineer", "Acme", "Remote", "Build models", "https://x/1", "indeed")
    }

    #[test]
    fn test_mock_model_without_template_builds_from_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let llm = MockLlm::new();
        let service = TailorService::new(&llm, dir.path(), None, "");
        let docs = service.generate(&profile(), &post(), "indeed_acme").unwrap();

        assert_eq!(docs.resume.tier, Tier::ScratchBuild);
        assert_eq!(docs.resume.failures[0].tier, Tier::TemplateMutation);
        assert_eq!(docs.resume.path, dir.path().join("indeed_acme_resume.docx"));
        assert_eq!(docs.cover_letter.path, dir.path().join("indeed_acme_cover_letter.docx"));
        assert_eq!(docs.data.experience[0].company, "Test Company");
    }

    #[test]
    fn test_offline_model_falls_back_to_profile_and_heuristic_letter() {
        let dir = tempfile::tempdir().unwrap();
        let service = TailorService::new(&Offline, dir.path(), None, "");
        let job = parse_job(&post());

        assert!(service.tailor_resume_data(&profile(), &job).is_empty());
        let body = service.cover_letter_body(&profile(), &job, "https://x/1");
        assert!(body[0].contains("ML Engineer position at Acme"));

        let docs = service.generate(&profile(), &post(), "slug").unwrap();
        let text = crate::docx::Document::open(&docs.resume.path).unwrap().text();
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("Data scientist"));
    }
}
