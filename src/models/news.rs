use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored keyword match, joined with its source name and keyword word.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub link: String,
    pub source_id: i64,
    pub source_name: String,
    pub pub_date: DateTime<Utc>,
    pub found_date: DateTime<Utc>,
    pub keyword_id: i64,
    pub keyword: String,
}

#[derive(Debug, Clone)]
pub struct NewNewsItem {
    pub title: String,
    pub content: String,
    pub link: String,
    pub source_id: i64,
    pub pub_date: DateTime<Utc>,
    pub found_date: DateTime<Utc>,
    pub keyword_id: i64,
}
