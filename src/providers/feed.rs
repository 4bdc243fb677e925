/// Provider backed by a JSON file of listings per source.
///
/// `<feeds_dir>/<name>.json` holds an array of
/// `{title, company, location, description, url}` objects, as exported by an
/// external scraper. Location filtering is left to the caller.
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::{JobProvider, Listings, ProviderError};
use crate::db::models::JobPost;

#[derive(Debug, Deserialize)]
struct RawListing {
    title: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    url: String,
}

pub struct FeedProvider {
    name: String,
    path: PathBuf,
}

impl FeedProvider {
    pub fn new(name: &str, feeds_dir: &Path) -> Self {
        Self {
            name: name.to_string(),
            path: feeds_dir.join(format!("{name}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<RawListing>, ProviderError> {
        let data = fs::read_to_string(&self.path).map_err(|e| {
            ProviderError::Unavailable(format!("{}: {e}", self.path.display()))
        })?;
        serde_json::from_str(&data).map_err(|e| ProviderError::Malformed {
            source_name: self.name.clone(),
            message: e.to_string(),
        })
    }
}

impl JobProvider for FeedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn search(&self, query: &str, _locations: &[String]) -> Result<Listings<'_>, ProviderError> {
        let listings = self.load()?;
        debug!("{}: {} listings in feed", self.name, listings.len());

        let query = query.trim().to_lowercase();
        let source = self.name.clone();
        let matches = listings.into_iter().filter_map(move |raw| {
            let hit = query.is_empty()
                || raw.title.to_lowercase().contains(&query)
                || raw.description.to_lowercase().contains(&query);
            hit.then(|| {
                JobPost::new(
                    &raw.title,
                    &raw.company,
                    &raw.location,
                    &raw.description,
                    &raw.url,
                    &source,
                )
            })
        });
        Ok(Box::new(matches))
    }
}
