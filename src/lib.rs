//! # jobtailor: job-search agent
//!
//! Gathers job listings from configured providers, drops duplicates and
//! listings outside the wanted locations, tailors a resume and cover letter
//! per job with a local language model, and records each application.
//!
//! ## Architecture
//!
//! - **[`config`]**: Environment-driven configuration and validation
//! - **[`filter`]**: Location allow-list and cross-provider job identity keys
//! - **[`rate_limit`]**: Token bucket gating provider fetches
//! - **[`providers`]**: Job listing sources (JSON feeds)
//! - **[`parser`]**: Text extraction, resume/job parsing, model response parsing
//! - **[`llm`]**: Local llama.cpp server client and deterministic mock
//! - **[`docx`]**: Minimal WordprocessingML reader/writer
//! - **[`render`]**: Template mutation, scratch build and plain-text fallback
//! - **[`tailor`]**: Tailored resume data model and per-job document generation
//! - **[`db`]**: SQLite store of seen jobs and application status
//! - **[`apply`]**: Application submission and outcome recording
//! - **[`pipeline`]**: Gather and process loops, background search

pub mod apply;
pub mod config;
pub mod db;
pub mod docx;
pub mod filter;
pub mod llm;
pub mod parser;
pub mod pipeline;
pub mod providers;
pub mod rate_limit;
pub mod render;
pub mod tailor;
