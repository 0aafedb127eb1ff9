use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

use crate::db::Repository;
use crate::error::Result;

use super::ingest::IngestPipeline;

/// Outcome of one sweep over the active sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub sources: usize,
    /// Growth of the news table across the sweep.
    pub new_items: u64,
}

impl SweepReport {
    fn new(sources: usize, initial: i64, current: i64) -> Self {
        Self {
            sources,
            new_items: current.saturating_sub(initial).max(0) as u64,
        }
    }
}

#[derive(Clone)]
pub struct Scheduler {
    repository: Repository,
    pipeline: IngestPipeline,
    interval: Duration,
}

pub struct SchedulerHandle {
    cancel_tx: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stops the timer loop, letting an in-flight sweep finish first.
    pub async fn stop(self) -> Result<()> {
        let _ = self.cancel_tx.send(());
        self.join.await.map_err(anyhow::Error::from)?;
        Ok(())
    }
}

impl Scheduler {
    pub fn new(repository: Repository, pipeline: IngestPipeline, interval: Duration) -> Self {
        Self {
            repository,
            pipeline,
            interval,
        }
    }

    /// Ingests every active source concurrently.
    ///
    /// Sources and keywords are read once up front, so configuration changes
    /// made while the sweep runs only apply to the next one.
    pub async fn run_sweep(&self) -> Result<SweepReport> {
        let (keywords, sources) = tokio::try_join!(
            self.repository.active_keywords(),
            self.repository.active_sources()
        )?;
        let initial = self.repository.count_news().await?;

        tracing::debug!(
            "Sweep over {} sources with {} keywords",
            sources.len(),
            keywords.len()
        );

        let keywords = Arc::new(keywords);
        let mut tasks = JoinSet::new();
        for source in sources.iter().cloned() {
            let pipeline = self.pipeline.clone();
            let keywords = Arc::clone(&keywords);
            tasks.spawn(async move { pipeline.ingest(&source, &keywords).await });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Source task failed: {}", e);
            }
        }

        let current = self.repository.count_news().await?;
        Ok(SweepReport::new(sources.len(), initial, current))
    }

    async fn sweep_and_log(&self) {
        tracing::info!("Checking feeds");
        match self.run_sweep().await {
            Ok(report) if report.new_items > 0 => {
                tracing::info!(
                    "Check finished: {} new items from {} sources",
                    report.new_items,
                    report.sources
                );
            }
            Ok(report) => {
                tracing::info!("Check finished: nothing new from {} sources", report.sources);
            }
            Err(e) => tracing::error!("Feed check failed: {}", e),
        }
    }

    /// Sweeps immediately, then once per interval until stopped.
    ///
    /// Sweeps run inside the timer loop and never overlap; a tick that comes
    /// due while a sweep is still running is skipped.
    pub fn spawn(self) -> SchedulerHandle {
        let (cancel_tx, mut cancel_rx) = broadcast::channel(1);
        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel_rx.recv() => {
                        tracing::info!("Scheduler stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.sweep_and_log().await;
                    }
                }
            }
        });

        SchedulerHandle { cancel_tx, join }
    }
}
