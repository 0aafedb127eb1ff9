use std::sync::Arc;

use chrono::Utc;

use crate::db::Repository;
use crate::error::Result;
use crate::feed::FeedFetcher;
use crate::models::{FeedItem, Keyword, NewNewsItem, Source};

use super::matcher;

/// Runs one source through fetch, dedup and keyword matching.
#[derive(Clone)]
pub struct IngestPipeline {
    repository: Repository,
    fetcher: Arc<FeedFetcher>,
}

impl IngestPipeline {
    pub fn new(repository: Repository, fetcher: FeedFetcher) -> Self {
        Self {
            repository,
            fetcher: Arc::new(fetcher),
        }
    }

    /// Ingests `source` against `keywords` and returns how many matches were stored.
    ///
    /// Never fails: every error is logged here so one broken source cannot
    /// disturb the rest of the sweep.
    pub async fn ingest(&self, source: &Source, keywords: &[Keyword]) -> usize {
        match self.try_ingest(source, keywords).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!("Error while checking source \"{}\": {}", source.name, e);
                0
            }
        }
    }

    async fn try_ingest(&self, source: &Source, keywords: &[Keyword]) -> Result<usize> {
        let feed = match self.fetcher.fetch(&source.url).await {
            Ok(feed) => feed,
            Err(e) => {
                self.repository.deactivate_source(source.id).await?;
                tracing::error!(
                    "Source \"{}\" deactivated after fetch errors: {}",
                    source.name,
                    e
                );
                return Ok(0);
            }
        };

        tracing::debug!(
            "Fetched \"{}\" ({}, {}) with {} items",
            feed.title.as_deref().unwrap_or(&source.name),
            feed.link.as_deref().unwrap_or(&source.url),
            feed.description.as_deref().unwrap_or("no description"),
            feed.items.len()
        );

        if feed.items.is_empty() {
            tracing::warn!("Source \"{}\" has no items", source.name);
            return Ok(0);
        }

        let mut found = 0;
        for item in &feed.items {
            match self.ingest_item(source, item, keywords).await {
                Ok(true) => found += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("Skipping {} from \"{}\": {}", item.link, source.name, e);
                }
            }
        }

        if found > 0 {
            tracing::info!("Found {} new items in \"{}\"", found, source.name);
        }
        Ok(found)
    }

    /// Stores `item` under the first keyword it matches. Returns whether a row was written.
    async fn ingest_item(&self, source: &Source, item: &FeedItem, keywords: &[Keyword]) -> Result<bool> {
        if item.link.is_empty() {
            tracing::debug!(
                "Item \"{}\" (guid {}) from \"{}\" has no link",
                item.title,
                item.guid.as_deref().unwrap_or("-"),
                source.name
            );
            return Ok(false);
        }

        if self.repository.news_exists(&item.link).await? {
            return Ok(false);
        }

        let text = item.match_text();
        for keyword in matcher::matching(&text, keywords) {
            // Deleted since the sweep started
            let Some(keyword_id) = self.repository.keyword_id(&keyword.word).await? else {
                continue;
            };

            let found_date = Utc::now();
            let news = NewNewsItem {
                title: item.title.clone(),
                content: item.body().to_string(),
                link: item.link.clone(),
                source_id: source.id,
                pub_date: item.pub_date.unwrap_or(found_date),
                found_date,
                keyword_id,
            };

            let inserted = self.repository.insert_news(news).await?;
            if inserted {
                tracing::info!(
                    "New item \"{}\" (source: {}, keyword: \"{}\")",
                    item.title,
                    source.name,
                    keyword.word
                );
            } else {
                tracing::debug!("{} was stored concurrently", item.link);
            }
            return Ok(inserted);
        }

        Ok(false)
    }
}
