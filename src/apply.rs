/// Application submission and outcome bookkeeping.
use std::path::Path;

use tracing::{info, warn};

use crate::db::Db;
use crate::db::models::{JobPost, STATUS_PREPARED, STATUS_SUBMITTED};

/// Submits generated documents to a job board.
pub trait Applicant: Send + Sync {
    /// `Ok(true)` when the application went through, `Ok(false)` when it
    /// was left for the user.
    fn apply(&self, job: &JobPost, resume: &Path, cover_letter: &Path) -> anyhow::Result<bool>;

    fn name(&self) -> &str;
}

/// Never submits; the documents stay on disk for manual submission.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualReviewApplicant;

impl Applicant for ManualReviewApplicant {
    fn apply(&self, job: &JobPost, resume: &Path, cover_letter: &Path) -> anyhow::Result<bool> {
        info!(
            "Ready for manual submission: {} at {} ({}) resume={} cover_letter={}",
            job.title,
            job.company,
            job.url,
            resume.display(),
            cover_letter.display()
        );
        Ok(false)
    }

    fn name(&self) -> &str {
        "manual-review"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Submitted,
    /// Documents generated but not submitted.
    Prepared,
    /// The applicant errored; nothing is recorded so a later run retries.
    Failed(String),
}

/// Run the applicant when `enabled`, folding its result into an outcome.
pub fn attempt(
    applicant: &dyn Applicant,
    job: &JobPost,
    resume: &Path,
    cover_letter: &Path,
    enabled: bool,
) -> ApplyOutcome {
    if !enabled {
        info!("Apply disabled for {}; documents prepared only", job.source);
        return ApplyOutcome::Prepared;
    }
    match applicant.apply(job, resume, cover_letter) {
        Ok(true) => ApplyOutcome::Submitted,
        Ok(false) => ApplyOutcome::Prepared,
        Err(e) => {
            warn!("{} failed on {}: {:#}", applicant.name(), job.job_id, e);
            ApplyOutcome::Failed(e.to_string())
        }
    }
}

/// Persist the outcome. Returns whether a record was written.
pub fn record_outcome(db: &Db, job: &JobPost, outcome: &ApplyOutcome) -> rusqlite::Result<bool> {
    match outcome {
        ApplyOutcome::Submitted => {
            db.mark_applied(&job.job_id, STATUS_SUBMITTED, &format!("via {}", job.source))?
        }
        ApplyOutcome::Prepared => db.mark_applied(&job.job_id, STATUS_PREPARED, "")?,
        ApplyOutcome::Failed(_) => return Ok(false),
    }
    Ok(true)
}
