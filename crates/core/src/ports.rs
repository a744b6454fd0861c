use crate::domain::VideoRecord;
use crate::error::CoreError;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Read side of the trending table.
pub trait RecordRepository: Send + Sync {
    /// Loads every record of the backing file, in file order.
    ///
    /// Each call re-reads the source; nothing is cached between calls.
    fn fetch_all_records(&self) -> Result<Vec<VideoRecord>>;
}

/// Rewrites the backing file with fresh trending data for a region.
pub trait TrendingIngestor: Send + Sync {
    fn ingest(&self, region: &str, limit: usize) -> Result<()>;
}

/// Live per-query lookup. Results are opaque JSON objects.
pub trait SearchScraper: Send + Sync {
    fn scrape(&self, query: &str) -> Result<Vec<serde_json::Value>>;
}
