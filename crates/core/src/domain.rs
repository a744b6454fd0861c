use serde::Serialize;

use crate::normalize::normalize_views;

/// One row of the trending table.
///
/// Serializes with the source column names so search results look like the
/// rows of the backing file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VideoRecord {
    pub title: String,
    #[serde(rename = "channelTitle")]
    pub channel: String,
    #[serde(rename = "viewCount")]
    pub views_raw: String,
    #[serde(skip)]
    pub views_normalized: i64,
    #[serde(rename = "publishedAt")]
    pub published: String, // opaque, passed through
    #[serde(rename = "videoUrl")]
    pub url: String,
    #[serde(rename = "videoId")]
    pub video_id: String,
}

impl VideoRecord {
    /// Builds a record, deriving the normalized view count from `views_raw`.
    pub fn new(
        title: String,
        channel: String,
        views_raw: String,
        published: String,
        url: String,
        video_id: String,
    ) -> Self {
        let views_normalized = normalize_views(Some(&views_raw));
        Self {
            title,
            channel,
            views_raw,
            views_normalized,
            published,
            url,
            video_id,
        }
    }

    pub fn to_listing(&self) -> VideoListing {
        VideoListing {
            title: self.title.clone(),
            channel: self.channel.clone(),
            views: self.views_raw.clone(),
            published: self.published.clone(),
            url: self.url.clone(),
        }
    }
}

/// Canonical projection served by the full listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoListing {
    pub title: String,
    pub channel: String,
    pub views: String,
    pub published: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<VideoRecord>,
    pub not_found: bool,
    pub query: String,
}

/// Parallel label/value sequences for charting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub data: Vec<i64>,
}
