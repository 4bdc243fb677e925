use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use jobtailor::config::Config;
use jobtailor::pipeline::{Context, SearchPrefs, gather_jobs, load_profile, process_jobs};
use jobtailor::providers::configured_providers;

#[derive(Parser)]
#[command(name = "jobtailor", version)]
#[command(about = "Gather job listings, tailor a resume and cover letter per job, record applications")]
struct Cli {
    /// Environment file loaded before reading configuration
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Process at most this many jobs
    #[arg(long)]
    limit: Option<usize>,

    /// Gather, filter and store jobs without tailoring or applying
    #[arg(long)]
    dry_run: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    show_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    load_env_file(&cli.env_file)?;

    let config = Config::from_env();
    if cli.show_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!("Starting jobtailor v{}", env!("CARGO_PKG_VERSION"));
    let mut ctx = Context::from_config(config)?;

    let providers = configured_providers(&ctx.config);
    let prefs = SearchPrefs::from_config(&ctx.config);
    let jobs = gather_jobs(&mut ctx, &providers, &prefs, None)?;

    if cli.dry_run {
        info!("Dry run: {} jobs stored, skipping tailoring", jobs.len());
        return Ok(());
    }

    let profile = load_profile(Path::new(&ctx.config.resume_path));
    let summary = process_jobs(&ctx, &jobs, &profile, cli.limit)?;
    info!(
        "Done: {} tailored, {} submitted, {} skipped, {} failed",
        summary.tailored, summary.submitted, summary.skipped, summary.failed
    );
    Ok(())
}

/// A missing default `.env` is fine; a missing explicit one is not.
fn load_env_file(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => {
            info!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() && path == Path::new(".env") => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to load {}", path.display())),
    }
}
