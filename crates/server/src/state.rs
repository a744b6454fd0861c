use std::sync::Arc;

use trending_core::{
    application::QueryService,
    ports::{RecordRepository, SearchScraper, TrendingIngestor},
    refresh::RefreshOrchestrator,
};

use super::{config::Config, session::SessionStore};

pub struct AppState {
    pub config: Config,
    pub queries: QueryService,
    pub refresh: RefreshOrchestrator,
    pub scraper: Arc<dyn SearchScraper>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        config: Config,
        repository: Arc<dyn RecordRepository>,
        ingestor: Arc<dyn TrendingIngestor>,
        scraper: Arc<dyn SearchScraper>,
    ) -> Arc<Self> {
        let refresh = RefreshOrchestrator::new(ingestor, config.refresh_policy);

        Arc::new(Self {
            queries: QueryService::new(repository),
            refresh,
            scraper,
            sessions: SessionStore::new(),
            config,
        })
    }
}
