use chrono::{DateTime, Utc};

/// A parsed feed, identical in shape whether it came from the direct
/// parser or from the JSON proxy.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone, Default)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub pub_date: Option<DateTime<Utc>>,
    pub content: Option<String>,
    pub snippet: Option<String>,
    pub guid: Option<String>,
}

impl FeedItem {
    /// Text stored alongside a match: the snippet when present, else the content.
    pub fn body(&self) -> &str {
        self.snippet
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.content.as_deref())
            .unwrap_or("")
    }

    /// Title and body joined, the blob keywords are matched against.
    pub fn match_text(&self) -> String {
        format!("{} {}", self.title, self.body())
    }
}
