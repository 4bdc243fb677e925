/// Gather listings from providers, then tailor and apply per job.
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use anyhow::{Context as _, Result};
use tracing::{debug, info, warn};

use crate::apply::{Applicant, ApplyOutcome, ManualReviewApplicant, attempt, record_outcome};
use crate::config::Config;
use crate::db::Db;
use crate::db::models::JobPost;
use crate::filter::is_location_ok;
use crate::llm::{LanguageModel, build_model};
use crate::parser::{ResumeProfile, extract_text, parse_resume};
use crate::providers::JobProvider;
use crate::rate_limit::{Clock, TokenBucket};
use crate::tailor::TailorService;

/// Everything a run needs, built once at startup.
pub struct Context {
    pub config: Config,
    pub limiter: TokenBucket,
    pub llm: Box<dyn LanguageModel>,
    pub db: Db,
    pub applicant: Box<dyn Applicant>,
}

impl Context {
    pub fn new(
        config: Config,
        llm: Box<dyn LanguageModel>,
        db: Db,
        applicant: Box<dyn Applicant>,
    ) -> Self {
        let limiter = TokenBucket::new(config.requests_per_min);
        Self {
            config,
            limiter,
            llm,
            db,
            applicant,
        }
    }

    /// Open the database and model backend named by `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let db = Db::open(&config.db_path)
            .with_context(|| format!("Failed to open database {}", config.db_path))?;
        let llm = build_model(&config).context("Failed to set up language model")?;
        Ok(Self::new(config, llm, db, Box::new(ManualReviewApplicant)))
    }
}

/// Search terms and location rules for one gather pass.
#[derive(Debug, Clone, Default)]
pub struct SearchPrefs {
    pub keywords: Vec<String>,
    /// Passed to providers as-is.
    pub locations: Vec<String>,
    pub cities: Vec<String>,
    pub countries: Vec<String>,
    pub remote_ok: bool,
    pub remote_global_ok: bool,
}

impl SearchPrefs {
    pub fn from_config(config: &Config) -> Self {
        Self {
            keywords: config.keywords.clone(),
            locations: config.search_locations(),
            cities: config.cities.clone(),
            countries: config.countries.clone(),
            remote_ok: config.remote_ok,
            remote_global_ok: config.remote_global_ok,
        }
    }

    pub fn accepts(&self, job: &JobPost) -> bool {
        is_location_ok(
            &job.location,
            &self.cities,
            &self.countries,
            self.remote_ok,
            self.remote_global_ok,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub fetched: usize,
    pub rejected_location: usize,
    pub duplicates: usize,
    pub accepted: usize,
    pub provider_errors: usize,
}

/// Keyword x provider loop shared by the foreground and background
/// searches. `running` is checked before every provider call.
fn search_listings<C, F>(
    limiter: &mut TokenBucket<C>,
    providers: &[Box<dyn JobProvider>],
    prefs: &SearchPrefs,
    running: Option<&AtomicBool>,
    mut accept: F,
) -> Result<SearchStats>
where
    C: Clock,
    F: FnMut(JobPost) -> Result<()>,
{
    let mut stats = SearchStats::default();
    let mut seen: HashSet<String> = HashSet::new();

    'outer: for keyword in &prefs.keywords {
        for provider in providers {
            if running.is_some_and(|r| !r.load(Ordering::SeqCst)) {
                info!("Search stopped");
                break 'outer;
            }
            limiter.consume_one();
            info!("Searching {} for '{}'", provider.name(), keyword);

            let listings = match provider.search(keyword, &prefs.locations) {
                Ok(listings) => listings,
                Err(e) => {
                    warn!("Provider {} error: {}", provider.name(), e);
                    stats.provider_errors += 1;
                    continue;
                }
            };
            for job in listings {
                stats.fetched += 1;
                if !prefs.accepts(&job) {
                    debug!("Rejected location '{}' for {}", job.location, job.title);
                    stats.rejected_location += 1;
                    continue;
                }
                if !seen.insert(job.job_id.clone()) {
                    stats.duplicates += 1;
                    continue;
                }
                accept(job)?;
                stats.accepted += 1;
            }
        }
    }
    Ok(stats)
}

/// Search every provider for every keyword, persisting accepted listings.
pub fn gather_jobs(
    ctx: &mut Context,
    providers: &[Box<dyn JobProvider>],
    prefs: &SearchPrefs,
    running: Option<&AtomicBool>,
) -> Result<Vec<JobPost>> {
    let db = &ctx.db;
    let mut jobs = Vec::new();
    let stats = search_listings(&mut ctx.limiter, providers, prefs, running, |job| {
        db.upsert_job(&job)
            .with_context(|| format!("Failed to store job {}", job.job_id))?;
        jobs.push(job);
        Ok(())
    })?;
    info!(
        "Gathered {} jobs ({} fetched, {} outside locations, {} duplicates, {} provider errors)",
        stats.accepted,
        stats.fetched,
        stats.rejected_location,
        stats.duplicates,
        stats.provider_errors
    );
    Ok(jobs)
}

/// Filename-safe prefix of `s`; spaces become dashes.
fn safe_part(s: &str, limit: usize) -> String {
    let kept: String = s
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ' '))
        .collect();
    let part: String = kept.trim().replace(' ', "-").chars().take(limit).collect();
    if part.is_empty() { "x".to_string() } else { part }
}

/// `{source}_{company}_{title}_{id prefix}`, stable per job.
pub fn job_slug(job: &JobPost) -> String {
    let id = job.job_id.get(..8).unwrap_or(&job.job_id);
    format!(
        "{}_{}_{}_{}",
        job.source,
        safe_part(&job.company, 10),
        safe_part(&job.title, 14),
        id
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub tailored: usize,
    pub submitted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Tailor documents for each new job and hand them to the applicant.
///
/// Jobs already carrying an application record are skipped. A job whose
/// documents cannot be produced is logged and skipped; database errors abort.
pub fn process_jobs(
    ctx: &Context,
    jobs: &[JobPost],
    profile: &ResumeProfile,
    limit: Option<usize>,
) -> Result<ProcessSummary> {
    let service = TailorService::from_config(ctx.llm.as_ref(), &ctx.config);
    let mut summary = ProcessSummary::default();
    let mut processed: HashSet<&str> = HashSet::new();

    for job in jobs {
        if limit.is_some_and(|l| summary.tailored + summary.failed >= l) {
            info!("Reached limit of {} jobs", summary.tailored + summary.failed);
            break;
        }
        if !processed.insert(job.job_id.as_str()) || ctx.db.is_applied(&job.job_id)? {
            summary.skipped += 1;
            continue;
        }

        let slug = job_slug(job);
        let docs = match service.generate(profile, job, &slug) {
            Ok(docs) => docs,
            Err(e) => {
                warn!("Skipping {} @ {}: {}", job.title, job.company, e);
                summary.failed += 1;
                continue;
            }
        };
        summary.tailored += 1;
        info!(
            "Tailored docs: {} ({}), {} ({})",
            docs.resume.path.display(),
            docs.resume.tier,
            docs.cover_letter.path.display(),
            docs.cover_letter.tier
        );

        let apply_enabled = ctx
            .config
            .providers
            .get(&job.source)
            .is_some_and(|p| p.apply);
        let outcome = attempt(
            ctx.applicant.as_ref(),
            job,
            &docs.resume.path,
            &docs.cover_letter.path,
            apply_enabled,
        );
        if outcome == ApplyOutcome::Submitted {
            summary.submitted += 1;
        }
        record_outcome(&ctx.db, job, &outcome)
            .with_context(|| format!("Failed to record application for {}", job.job_id))?;
        info!(
            "Outcome {:?} for {} @ {} ({}) -> {}",
            outcome, job.title, job.company, job.source, job.url
        );
    }
    Ok(summary)
}

/// Parse the configured source resume. A missing or unreadable file gives an
/// empty profile.
pub fn load_profile(path: &Path) -> ResumeProfile {
    let text = extract_text(path);
    if text.trim().is_empty() {
        warn!("No text extracted from resume {}", path.display());
    }
    let profile = parse_resume(&text);
    info!("Parsed resume: name={} email={}", profile.name, profile.email);
    profile
}

/// Provider search on a worker thread. Results accumulate in a shared list
/// the caller can read at any time; [`BackgroundSearch::stop`] takes effect
/// before the next provider call.
pub struct BackgroundSearch {
    results: Arc<Mutex<Vec<JobPost>>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<Result<SearchStats>>>,
}

impl BackgroundSearch {
    pub fn start(providers: Vec<Box<dyn JobProvider>>, prefs: SearchPrefs, rate_per_min: u32) -> Self {
        let results = Arc::new(Mutex::new(Vec::new()));
        let running = Arc::new(AtomicBool::new(true));

        let shared = Arc::clone(&results);
        let flag = Arc::clone(&running);
        let handle = std::thread::spawn(move || {
            let mut limiter = TokenBucket::new(rate_per_min);
            let stats = search_listings(&mut limiter, &providers, &prefs, Some(flag.as_ref()), |job| {
                shared
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(job);
                Ok(())
            });
            flag.store(false, Ordering::SeqCst);
            stats
        });

        Self {
            results,
            running,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Copy of the results so far.
    pub fn snapshot(&self) -> Vec<JobPost> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait for the worker and take every result.
    pub fn join(mut self) -> Result<(Vec<JobPost>, SearchStats)> {
        let stats = match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow::anyhow!("background search thread panicked"))??,
            None => SearchStats::default(),
        };
        let jobs = std::mem::take(&mut *self.results.lock().unwrap_or_else(PoisonError::into_inner));
        Ok((jobs, stats))
    }
}

impl Drop for BackgroundSearch {
    fn drop(&mut self) {
        self.stop();
    }
}
