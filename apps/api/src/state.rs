use std::sync::Arc;

use crate::config::Config;
use crate::documents::TextExtractor;
use crate::jobs::repository::JobStore;
use crate::matching::extractor::KeywordExtractor;
use crate::sync::client::ListingsClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Keyword extractor over the built-in taxonomy, compiled once at startup.
    pub extractor: KeywordExtractor,
    /// Pluggable document reader. Default: DocumentTextExtractor.
    pub documents: Arc<dyn TextExtractor>,
    pub jobs: Arc<dyn JobStore>,
    pub listings: ListingsClient,
}

#[cfg(test)]
impl AppState {
    /// State over an in-memory store with the built-in taxonomy.
    pub fn for_tests(jobs: Arc<dyn JobStore>) -> Self {
        use crate::documents::DocumentTextExtractor;
        use crate::matching::taxonomy::Taxonomy;

        let config = Config::for_tests();
        let taxonomy = Taxonomy::builtin().expect("built-in taxonomy is valid");
        AppState {
            listings: ListingsClient::new(&config.listings_url)
                .expect("test listings client builds"),
            config,
            extractor: KeywordExtractor::new(Arc::new(taxonomy)),
            documents: Arc::new(DocumentTextExtractor),
            jobs,
        }
    }
}
