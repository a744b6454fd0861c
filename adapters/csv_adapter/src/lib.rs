use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};
use trending_core::domain::VideoRecord;
use trending_core::error::CoreError;
use trending_core::ports::{RecordRepository, Result};

/// Source column names, as written by the trending ingestor.
pub const COLUMN_TITLE: &str = "title";
pub const COLUMN_CHANNEL: &str = "channelTitle";
pub const COLUMN_VIEWS: &str = "viewCount";
pub const COLUMN_PUBLISHED: &str = "publishedAt";
pub const COLUMN_URL: &str = "videoUrl";
pub const COLUMN_VIDEO_ID: &str = "videoId";

/// CSV implementation of the RecordRepository trait
pub struct CsvRecordRepository {
    path: PathBuf,
}

impl CsvRecordRepository {
    /// Creates a new CsvRecordRepository over the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<File> {
        File::open(&self.path).map_err(|e| {
            warn!("Trending data file {} unavailable: {e}", self.path.display());
            match e.kind() {
                io::ErrorKind::NotFound => CoreError::DataUnavailable(format!(
                    "{} not found",
                    self.path.display()
                )),
                _ => CoreError::DataUnavailable(format!("{}: {e}", self.path.display())),
            }
        })
    }
}

/// Header positions of the known columns. Unknown columns are ignored.
struct ColumnMap {
    title: Option<usize>,
    channel: Option<usize>,
    views: Option<usize>,
    published: Option<usize>,
    url: Option<usize>,
    video_id: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let position = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim_start_matches('\u{feff}') == name)
        };

        Self {
            title: position(COLUMN_TITLE),
            channel: position(COLUMN_CHANNEL),
            views: position(COLUMN_VIEWS),
            published: position(COLUMN_PUBLISHED),
            url: position(COLUMN_URL),
            video_id: position(COLUMN_VIDEO_ID),
        }
    }

    /// Maps one row. Missing columns and short rows yield empty strings.
    fn to_record(&self, row: &StringRecord) -> VideoRecord {
        let field = |index: Option<usize>| {
            index
                .and_then(|i| row.get(i))
                .unwrap_or_default()
                .to_string()
        };

        VideoRecord::new(
            field(self.title),
            field(self.channel),
            field(self.views),
            field(self.published),
            field(self.url),
            field(self.video_id),
        )
    }
}

impl RecordRepository for CsvRecordRepository {
    fn fetch_all_records(&self) -> Result<Vec<VideoRecord>> {
        let file = self.open()?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let columns = ColumnMap::from_headers(reader.headers().map_err(unavailable)?);

        let records = reader
            .records()
            .map(|row| row.map(|row| columns.to_record(&row)))
            .collect::<std::result::Result<Vec<_>, csv::Error>>()
            .map_err(unavailable)?;

        debug!("Loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }
}

fn unavailable(e: csv::Error) -> CoreError {
    warn!("Failed to read trending data: {e}");
    CoreError::DataUnavailable(e.to_string())
}
