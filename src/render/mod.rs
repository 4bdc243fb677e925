/// Output document rendering with graceful degradation.
///
/// A [`Ladder`] holds an ordered list of [`RenderStrategy`] tiers. Each tier
/// is tried only after the previous one failed, every failure is recorded in
/// the [`RenderOutcome`], and only exhausting the last tier is an error.
///
/// Resume tiers: [`template::TemplateMutation`] (edit the user's DOCX template
/// in place), [`scratch::ScratchBuild`] (generate a plainly styled DOCX) and
/// [`plain_text::PlainText`]. Cover letters use a DOCX tier and a plain-text
/// tier over the same machinery.
pub mod blocks;
pub mod cover_letter;
pub mod plain_text;
pub mod scratch;
pub mod template;

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::docx::DocxError;
use crate::parser::ResumeProfile;
use crate::tailor::TailoredResumeData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    TemplateMutation,
    ScratchBuild,
    PlainText,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::TemplateMutation => "template-mutation",
            Tier::ScratchBuild => "scratch-build",
            Tier::PlainText => "plain-text",
        })
    }
}

/// Why one tier did not produce a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierFailure {
    pub tier: Tier,
    pub reason: String,
}

impl fmt::Display for TierFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.tier, self.reason)
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no template configured")]
    NoTemplate,

    #[error("nothing to render: {0}")]
    NoContent(String),

    #[error(transparent)]
    Docx(#[from] DocxError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("all render tiers failed ({})", join_failures(.0))]
    Exhausted(Vec<TierFailure>),
}

fn join_failures(failures: &[TierFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A successfully written document and the failures that led to it.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub path: PathBuf,
    pub tier: Tier,
    pub failures: Vec<TierFailure>,
}

impl RenderOutcome {
    pub fn degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Everything the resume tiers draw from.
#[derive(Debug, Clone, Copy)]
pub struct ResumeInput<'a> {
    pub profile: &'a ResumeProfile,
    pub tailored: &'a TailoredResumeData,
    pub template: Option<&'a Path>,
}

/// One way of producing a document at `output` (the extension is chosen by
/// the strategy). Returns the path actually written.
pub trait RenderStrategy<I: ?Sized>: Send + Sync {
    fn tier(&self) -> Tier;

    fn render(&self, input: &I, output: &Path) -> Result<PathBuf, RenderError>;
}

pub struct Ladder<I: ?Sized> {
    strategies: Vec<Box<dyn RenderStrategy<I>>>,
}

impl<I: ?Sized> Ladder<I> {
    pub fn new(strategies: Vec<Box<dyn RenderStrategy<I>>>) -> Self {
        Self { strategies }
    }

    pub fn tiers(&self) -> Vec<Tier> {
        self.strategies.iter().map(|s| s.tier()).collect()
    }

    pub fn render(&self, input: &I, output: &Path) -> Result<RenderOutcome, RenderError> {
        let mut failures = Vec::new();
        for strategy in &self.strategies {
            let tier = strategy.tier();
            match strategy.render(input, output) {
                Ok(path) => {
                    if failures.is_empty() {
                        info!("Rendered {} via {}", path.display(), tier);
                    } else {
                        warn!(
                            "Rendered {} via {} after {} failed tier(s)",
                            path.display(),
                            tier,
                            failures.len()
                        );
                    }
                    return Ok(RenderOutcome {
                        path,
                        tier,
                        failures,
                    });
                }
                Err(e) => {
                    warn!("Render tier {} failed: {}", tier, e);
                    failures.push(TierFailure {
                        tier,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Err(RenderError::Exhausted(failures))
    }
}

/// Template mutation, then scratch build, then plain text.
pub fn resume_ladder<'a>() -> Ladder<ResumeInput<'a>> {
    Ladder::new(vec![
        Box::new(template::TemplateMutation),
        Box::new(scratch::ScratchBuild),
        Box::new(plain_text::PlainText),
    ])
}
