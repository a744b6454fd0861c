use std::sync::Arc;

use tracing::warn;

use crate::domain::{ChartSeries, SearchOutcome, VideoListing, VideoRecord};
use crate::error::CoreError;
use crate::ports::{RecordRepository, Result};

/// Number of entries in the view-count chart.
pub const TOP_N: usize = 20;

/// Application service answering read queries over the trending table
pub struct QueryService {
    repository: Arc<dyn RecordRepository>,
}

impl QueryService {
    /// Creates a new QueryService reading through the given repository
    pub fn new(repository: Arc<dyn RecordRepository>) -> Self {
        Self { repository }
    }

    /// Case-insensitive substring search over titles.
    ///
    /// An empty query matches every record. A load that yields no records at
    /// all is reported as [`CoreError::DataUnavailable`], which callers must
    /// keep apart from an empty match list.
    pub fn search(&self, query: &str) -> Result<SearchOutcome> {
        let query = query.to_lowercase();
        let records = self.repository.fetch_all_records()?;
        if records.is_empty() {
            warn!("Search over an empty trending table");
            return Err(CoreError::DataUnavailable("no records loaded".to_string()));
        }

        let results: Vec<VideoRecord> = records
            .into_iter()
            .filter(|record| record.title.to_lowercase().contains(&query))
            .collect();

        Ok(SearchOutcome {
            not_found: results.is_empty(),
            results,
            query,
        })
    }

    /// Every record, projected, in load order
    pub fn list_videos(&self) -> Result<Vec<VideoListing>> {
        let records = self.repository.fetch_all_records()?;
        Ok(records.iter().map(VideoRecord::to_listing).collect())
    }

    /// The `limit` most viewed records, descending by normalized view count.
    /// Ties keep their load order.
    pub fn top_by_views(&self, limit: usize) -> Result<ChartSeries> {
        let mut records = self.repository.fetch_all_records()?;
        // sort_by is stable
        records.sort_by(|a, b| b.views_normalized.cmp(&a.views_normalized));
        records.truncate(limit);

        let (labels, data) = records
            .into_iter()
            .map(|record| (record.title, record.views_normalized))
            .unzip();

        Ok(ChartSeries { labels, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedRepository {
        records: Option<Vec<VideoRecord>>,
        loads: AtomicUsize,
    }

    impl FixedRepository {
        fn with(records: Vec<VideoRecord>) -> Self {
            Self {
                records: Some(records),
                loads: AtomicUsize::new(0),
            }
        }

        fn missing() -> Self {
            Self {
                records: None,
                loads: AtomicUsize::new(0),
            }
        }
    }

    impl RecordRepository for FixedRepository {
        fn fetch_all_records(&self) -> Result<Vec<VideoRecord>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.records
                .clone()
                .ok_or_else(|| CoreError::DataUnavailable("missing".to_string()))
        }
    }

    fn record(title: &str, views: &str) -> VideoRecord {
        VideoRecord::new(
            title.to_string(),
            "channel".to_string(),
            views.to_string(),
            "2025-01-01T00:00:00Z".to_string(),
            format!("https://www.youtube.com/watch?v={title}"),
            title.to_string(),
        )
    }

    fn service(records: Vec<VideoRecord>) -> QueryService {
        QueryService::new(Arc::new(FixedRepository::with(records)))
    }

    #[test]
    fn test_search_empty_query_returns_everything() {
        let svc = service(vec![record("Alpha", "1"), record("Beta", "2")]);
        let outcome = svc.search("").unwrap();
        assert_eq!(outcome.results.len(), 2);
        assert!(!outcome.not_found);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let svc = service(vec![record("Cricket Highlights", "1"), record("Cooking", "2")]);
        let outcome = svc.search("CRICKET").unwrap();
        assert_eq!(outcome.query, "cricket");
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].title, "Cricket Highlights");
    }

    #[test]
    fn test_search_no_match_sets_not_found() {
        let svc = service(vec![record("Alpha", "1")]);
        let outcome = svc.search("zeta").unwrap();
        assert!(outcome.results.is_empty());
        assert!(outcome.not_found);
    }

    #[test]
    fn test_search_missing_file_is_data_unavailable() {
        let svc = QueryService::new(Arc::new(FixedRepository::missing()));
        assert!(matches!(svc.search("x"), Err(CoreError::DataUnavailable(_))));
    }

    #[test]
    fn test_search_empty_table_is_data_unavailable() {
        let svc = service(Vec::new());
        assert!(matches!(svc.search(""), Err(CoreError::DataUnavailable(_))));
    }

    #[test]
    fn test_list_videos_keeps_load_order() {
        let svc = service(vec![record("b", "1"), record("a", "2")]);
        let titles: Vec<String> = svc
            .list_videos()
            .unwrap()
            .into_iter()
            .map(|listing| listing.title)
            .collect();
        assert_eq!(titles, vec!["b", "a"]);
    }

    #[test]
    fn test_list_videos_empty_table_is_empty_list() {
        assert!(service(Vec::new()).list_videos().unwrap().is_empty());
    }

    #[test]
    fn test_top_by_views_sorts_descending() {
        let svc = service(vec![
            record("small", "900"),
            record("big", "2M views"),
            record("mid", "1.5K views"),
        ]);
        let chart = svc.top_by_views(TOP_N).unwrap();
        assert_eq!(chart.labels, vec!["big", "mid", "small"]);
        assert_eq!(chart.data, vec![2_000_000, 1_500, 900]);
    }

    #[test]
    fn test_top_by_views_truncates_to_limit() {
        let records = (0..30).map(|i| record(&format!("v{i}"), &i.to_string())).collect();
        let chart = service(records).top_by_views(TOP_N).unwrap();
        assert_eq!(chart.labels.len(), TOP_N);
        assert_eq!(chart.data.len(), TOP_N);
        assert!(chart.data.windows(2).all(|pair| pair[0] >= pair[1]));
        assert_eq!(chart.data[0], 29);
    }

    #[test]
    fn test_top_by_views_shorter_table() {
        let chart = service(vec![record("only", "5")]).top_by_views(TOP_N).unwrap();
        assert_eq!(chart.labels, vec!["only"]);
    }

    #[test]
    fn test_top_by_views_ties_keep_load_order() {
        let svc = service(vec![
            record("first", "1K"),
            record("garbage", "n/a"),
            record("second", "1,000"),
            record("third", "1000 views"),
        ]);
        let chart = svc.top_by_views(TOP_N).unwrap();
        assert_eq!(chart.labels, vec!["first", "second", "third", "garbage"]);
        assert_eq!(chart.data, vec![1_000, 1_000, 1_000, 0]);
    }

    #[test]
    fn test_every_query_reloads() {
        let repo = Arc::new(FixedRepository::with(vec![record("a", "1")]));
        let svc = QueryService::new(repo.clone());
        svc.search("").unwrap();
        svc.list_videos().unwrap();
        svc.top_by_views(TOP_N).unwrap();
        assert_eq!(repo.loads.load(Ordering::SeqCst), 3);
    }
}
