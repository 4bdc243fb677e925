/// Job listing sources.
///
/// A provider turns a keyword query into a sequence of [`JobPost`]s. Any
/// failure to reach the source is a [`ProviderError`]; the pipeline logs it
/// and moves on to the next provider.
pub mod feed;

use std::path::Path;

use thiserror::Error;

use crate::config::{Config, PROVIDER_NAMES};
use crate::db::models::JobPost;

pub use feed::FeedProvider;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed listings in {source_name}: {message}")]
    Malformed { source_name: String, message: String },
}

pub type Listings<'a> = Box<dyn Iterator<Item = JobPost> + Send + 'a>;

pub trait JobProvider: Send + Sync {
    /// Source tag stored on every post (`"linkedin"`, `"indeed"`, ...).
    fn name(&self) -> &str;

    /// One pass over the listings matching `query`.
    fn search(&self, query: &str, locations: &[String]) -> Result<Listings<'_>, ProviderError>;
}

/// Feed providers for every provider enabled in `config`, in search order.
pub fn configured_providers(config: &Config) -> Vec<Box<dyn JobProvider>> {
    PROVIDER_NAMES
        .iter()
        .filter(|name| config.providers.get(name).is_some_and(|p| p.enabled))
        .map(|name| {
            Box::new(FeedProvider::new(name, Path::new(&config.feeds_dir))) as Box<dyn JobProvider>
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_providers_respect_enable_flags() {
        let mut config = Config::default();
        config.providers.indeed.enabled = false;
        let names: Vec<String> = configured_providers(&config)
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, ["wellfound", "internshala", "linkedin"]);
    }
}
