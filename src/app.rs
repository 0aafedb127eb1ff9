use std::time::Duration;

use url::Url;

use crate::cli::{Command, USAGE};
use crate::config::Config;
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::feed::FeedFetcher;
use crate::services::{IngestPipeline, Scheduler};

pub struct App {
    config: Config,
    pub repository: Repository,
}

impl App {
    /// Opens the store and seeds the default sources and keywords on first boot.
    pub async fn new(config: Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        repository.seed_defaults().await?;

        Ok(Self { config, repository })
    }

    fn scheduler(&self) -> Result<Scheduler> {
        let fetcher = FeedFetcher::new(&self.config)?;
        let pipeline = IngestPipeline::new(self.repository.clone(), fetcher);
        let interval = Duration::from_secs(u64::from(self.config.refresh_interval_minutes) * 60);
        Ok(Scheduler::new(self.repository.clone(), pipeline, interval))
    }

    pub async fn handle(&self, command: Command) -> Result<()> {
        match command {
            Command::Run => {
                tracing::info!(
                    "Checking feeds every {} minutes",
                    self.config.refresh_interval_minutes
                );
                let handle = self.scheduler()?.spawn();
                tokio::signal::ctrl_c().await?;
                tracing::info!("Shutting down");
                handle.stop().await?;
            }

            Command::Once => {
                let report = self.scheduler()?.run_sweep().await?;
                println!(
                    "Checked {} sources, {} new items",
                    report.sources, report.new_items
                );
            }

            Command::News { json } => {
                let news = self.repository.list_news().await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&news)?);
                } else {
                    for item in news {
                        println!(
                            "{}  [{}] {} ({})\n    {}",
                            item.found_date.format("%Y-%m-%d %H:%M"),
                            item.keyword,
                            item.title,
                            item.source_name,
                            item.link
                        );
                    }
                }
            }

            Command::Sources => {
                for source in self.repository.all_sources().await? {
                    println!(
                        "{:>4} {} {} <{}>",
                        source.id,
                        if source.active { "on " } else { "off" },
                        source.name,
                        source.url
                    );
                }
            }

            Command::Keywords => {
                for keyword in self.repository.all_keywords().await? {
                    println!(
                        "{:>4} {} {}",
                        keyword.id,
                        if keyword.active { "on " } else { "off" },
                        keyword.word
                    );
                }
            }

            Command::AddSource { url, name } => {
                let (url, name) = validate_source(&url, &name)?;
                let id = self.repository.add_source(url, name).await?;
                println!("Added source #{}", id);
            }

            Command::AddKeyword { word } => {
                let word = word.trim();
                if word.is_empty() {
                    return Err(AppError::Usage("Keyword must not be empty".to_string()));
                }
                let id = self.repository.add_keyword(word.to_string()).await?;
                println!("Added keyword #{}", id);
            }

            Command::SetSourceActive { id, active } => {
                self.repository.set_source_active(id, active).await?;
            }

            Command::SetKeywordActive { id, active } => {
                self.repository.set_keyword_active(id, active).await?;
            }

            Command::RemoveSource { id } => {
                self.repository.delete_source(id).await?;
            }

            Command::RemoveKeyword { id } => {
                self.repository.delete_keyword(id).await?;
            }

            Command::Help => println!("{}", USAGE),
        }

        Ok(())
    }
}

fn validate_source(url: &str, name: &str) -> Result<(String, String)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Usage("Source name must not be empty".to_string()));
    }

    let parsed = Url::parse(url.trim())
        .map_err(|e| AppError::Usage(format!("Invalid feed URL {:?}: {}", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::Usage(format!("Feed URL must be http(s): {}", url)));
    }

    Ok((url.trim().to_string(), name.to_string()))
}
