use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::{job_key, normalize_location};

/// One scraped posting. `job_id` is derived from title, company and location
/// at construction and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPost {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub url: String,
    pub source: String,
    pub job_id: String,
}

impl JobPost {
    pub fn new(
        title: &str,
        company: &str,
        location: &str,
        description: &str,
        url: &str,
        source: &str,
    ) -> Self {
        let title = title.trim().to_string();
        let company = company.trim().to_string();
        let location = normalize_location(Some(location));
        let job_id = job_key(&title, &company, &location);
        Self {
            title,
            company,
            location,
            description: description.trim().to_string(),
            url: url.trim().to_string(),
            source: source.to_string(),
            job_id,
        }
    }
}

/// A row of the `jobs` table.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of an application attempt, keyed by job id.
#[derive(Debug, Clone)]
pub struct ApplicationRecord {
    pub job_id: String,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub notes: String,
}

pub const STATUS_SUBMITTED: &str = "submitted";
pub const STATUS_PREPARED: &str = "prepared";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_post_identity() {
        let a = JobPost::new("ML Engineer", "Acme", " Pune ", "desc", "https://a", "indeed");
        let b = JobPost::new("ml engineer ", "ACME", "pune", "other", "https://b", "linkedin");
        assert_eq!(a.location, "Pune");
        assert_eq!(a.job_id, b.job_id);
        assert_eq!(a.job_id, job_key("ML Engineer", "Acme", "Pune"));
    }
}
