//! Response shape of the feed-to-JSON proxy used when a feed cannot be
//! fetched or parsed directly.

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Feed, FeedItem};

use super::parse_datetime;

#[derive(Debug, Deserialize)]
pub(super) struct ProxyResponse {
    status: String,
    message: Option<String>,
    feed: Option<ProxyFeed>,
    items: Option<Vec<ProxyItem>>,
}

#[derive(Debug, Deserialize)]
struct ProxyFeed {
    title: Option<String>,
    description: Option<String>,
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProxyItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    content: Option<String>,
    description: Option<String>,
    guid: Option<String>,
}

impl ProxyResponse {
    pub(super) fn into_feed(self) -> Result<Feed> {
        if self.status != "ok" {
            return Err(AppError::Proxy(
                self.message
                    .unwrap_or_else(|| format!("unexpected status {:?}", self.status)),
            ));
        }

        let (title, description, link) = match self.feed {
            Some(feed) => (feed.title, feed.description, feed.link),
            None => (None, None, None),
        };

        let items = self
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| FeedItem {
                title: item.title.unwrap_or_default(),
                link: item.link.unwrap_or_default(),
                pub_date: item.pub_date.as_deref().and_then(parse_datetime),
                content: item.content,
                snippet: item.description,
                guid: item.guid,
            })
            .collect();

        Ok(Feed {
            title,
            description,
            link,
            items,
        })
    }
}
