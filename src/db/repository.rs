use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::feed::parse_datetime;
use crate::models::{Keyword, NewNewsItem, NewsItem, Source};

use super::schema::SCHEMA;
use super::seed::{DEFAULT_KEYWORDS, DEFAULT_SOURCES};

/// Outcome of a configuration insert that may hit a unique constraint.
enum Write<T> {
    Done(T),
    Duplicate,
}

/// Async handle over the SQLite store shared by the scheduler tasks.
///
/// Cloning is cheap; every clone talks to the same connection thread, and
/// the `UNIQUE(link)` constraint is what serializes concurrent inserts of
/// the same item.
#[derive(Clone)]
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::init(conn).await
    }

    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Inserts the default sources and keywords into whichever table is empty.
    pub async fn seed_defaults(&self) -> Result<()> {
        let (sources_seeded, keywords_seeded) = self
            .conn
            .call(|conn| {
                let tx = conn.transaction()?;

                let source_count: i64 =
                    tx.query_row("SELECT COUNT(*) FROM sources", [], |row| row.get(0))?;
                if source_count == 0 {
                    let mut stmt = tx.prepare("INSERT INTO sources (url, name) VALUES (?1, ?2)")?;
                    for (url, name) in DEFAULT_SOURCES {
                        stmt.execute(params![url, name])?;
                    }
                }

                let keyword_count: i64 =
                    tx.query_row("SELECT COUNT(*) FROM keywords", [], |row| row.get(0))?;
                if keyword_count == 0 {
                    let mut stmt = tx.prepare("INSERT INTO keywords (word) VALUES (?1)")?;
                    for word in DEFAULT_KEYWORDS {
                        stmt.execute(params![word])?;
                    }
                }

                tx.commit()?;
                Ok((source_count == 0, keyword_count == 0))
            })
            .await?;

        if sources_seeded {
            tracing::info!("Seeded {} default sources", DEFAULT_SOURCES.len());
        }
        if keywords_seeded {
            tracing::info!("Seeded {} default keywords", DEFAULT_KEYWORDS.len());
        }
        Ok(())
    }

    // Source operations

    pub async fn active_sources(&self) -> Result<Vec<Source>> {
        self.query_sources("SELECT id, url, name, active FROM sources WHERE active = 1 ORDER BY id")
            .await
    }

    pub async fn all_sources(&self) -> Result<Vec<Source>> {
        self.query_sources("SELECT id, url, name, active FROM sources ORDER BY id")
            .await
    }

    async fn query_sources(&self, sql: &'static str) -> Result<Vec<Source>> {
        let sources = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(sql)?;
                let sources = stmt
                    .query_map([], source_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(sources)
            })
            .await?;
        Ok(sources)
    }

    pub async fn add_source(&self, url: String, name: String) -> Result<i64> {
        let label = url.clone();
        let outcome = self
            .conn
            .call(move |conn| {
                match conn.execute(
                    "INSERT INTO sources (url, name) VALUES (?1, ?2)",
                    params![url, name],
                ) {
                    Ok(_) => Ok(Write::Done(conn.last_insert_rowid())),
                    Err(e) if is_unique_violation(&e) => Ok(Write::Duplicate),
                    Err(e) => Err(e.into()),
                }
            })
            .await?;
        resolve_write(outcome, || format!("source {}", label))
    }

    pub async fn set_source_active(&self, id: i64, active: bool) -> Result<()> {
        let changed = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    "UPDATE sources SET active = ?1 WHERE id = ?2",
                    params![active, id],
                )?;
                Ok(changed)
            })
            .await?;
        if changed == 0 {
            return Err(AppError::NotFound(format!("source #{}", id)));
        }
        Ok(())
    }

    /// Marks a source inactive after it could not be fetched by any path.
    pub async fn deactivate_source(&self, id: i64) -> Result<()> {
        self.set_source_active(id, false).await
    }

    pub async fn delete_source(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .call(move |conn| {
                let changed = conn.execute("DELETE FROM sources WHERE id = ?1", params![id])?;
                Ok(changed)
            })
            .await?;
        if changed == 0 {
            return Err(AppError::NotFound(format!("source #{}", id)));
        }
        Ok(())
    }

    // Keyword operations

    /// Active keywords in registry order; the first match wins, so order matters.
    pub async fn active_keywords(&self) -> Result<Vec<Keyword>> {
        self.query_keywords("SELECT id, word, active FROM keywords WHERE active = 1 ORDER BY id")
            .await
    }

    pub async fn all_keywords(&self) -> Result<Vec<Keyword>> {
        self.query_keywords("SELECT id, word, active FROM keywords ORDER BY id")
            .await
    }

    async fn query_keywords(&self, sql: &'static str) -> Result<Vec<Keyword>> {
        let keywords = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(sql)?;
                let keywords = stmt
                    .query_map([], keyword_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(keywords)
            })
            .await?;
        Ok(keywords)
    }

    /// Looks a keyword up by word; `None` once it has been deleted.
    pub async fn keyword_id(&self, word: &str) -> Result<Option<i64>> {
        let word = word.to_string();
        let id = self
            .conn
            .call(move |conn| {
                let id = conn
                    .query_row(
                        "SELECT id FROM keywords WHERE word = ?1",
                        params![word],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(id)
            })
            .await?;
        Ok(id)
    }

    pub async fn add_keyword(&self, word: String) -> Result<i64> {
        let label = word.clone();
        let outcome = self
            .conn
            .call(move |conn| {
                match conn.execute("INSERT INTO keywords (word) VALUES (?1)", params![word]) {
                    Ok(_) => Ok(Write::Done(conn.last_insert_rowid())),
                    Err(e) if is_unique_violation(&e) => Ok(Write::Duplicate),
                    Err(e) => Err(e.into()),
                }
            })
            .await?;
        resolve_write(outcome, || format!("keyword {}", label))
    }

    pub async fn set_keyword_active(&self, id: i64, active: bool) -> Result<()> {
        let changed = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    "UPDATE keywords SET active = ?1 WHERE id = ?2",
                    params![active, id],
                )?;
                Ok(changed)
            })
            .await?;
        if changed == 0 {
            return Err(AppError::NotFound(format!("keyword #{}", id)));
        }
        Ok(())
    }

    pub async fn delete_keyword(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .call(move |conn| {
                let changed = conn.execute("DELETE FROM keywords WHERE id = ?1", params![id])?;
                Ok(changed)
            })
            .await?;
        if changed == 0 {
            return Err(AppError::NotFound(format!("keyword #{}", id)));
        }
        Ok(())
    }

    // News operations

    pub async fn news_exists(&self, link: &str) -> Result<bool> {
        let link = link.to_string();
        let exists = self
            .conn
            .call(move |conn| {
                let exists = conn
                    .query_row("SELECT id FROM news WHERE link = ?1", params![link], |_| Ok(()))
                    .optional()?
                    .is_some();
                Ok(exists)
            })
            .await?;
        Ok(exists)
    }

    /// Stores a match. Returns `false` when another writer already stored
    /// the same link; the unique constraint is the authority on duplicates.
    pub async fn insert_news(&self, news: NewNewsItem) -> Result<bool> {
        let inserted = self
            .conn
            .call(move |conn| {
                match conn.execute(
                    r#"INSERT INTO news (title, content, link, source_id, pub_date, found_date, keyword_id)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                    params![
                        news.title,
                        news.content,
                        news.link,
                        news.source_id,
                        news.pub_date.to_rfc3339(),
                        news.found_date.to_rfc3339(),
                        news.keyword_id,
                    ],
                ) {
                    Ok(_) => Ok(true),
                    Err(e) if is_unique_violation(&e) => Ok(false),
                    Err(e) => Err(e.into()),
                }
            })
            .await?;
        Ok(inserted)
    }

    pub async fn count_news(&self) -> Result<i64> {
        let count = self
            .conn
            .call(|conn| {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM news", [], |row| row.get(0))?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }

    pub async fn list_news(&self) -> Result<Vec<NewsItem>> {
        let news = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT n.id, n.title, n.content, n.link, n.source_id, s.name,
                              n.pub_date, n.found_date, n.keyword_id, k.word
                       FROM news n
                       JOIN sources s ON n.source_id = s.id
                       JOIN keywords k ON n.keyword_id = k.id
                       ORDER BY n.found_date DESC, n.id DESC"#,
                )?;
                let news = stmt
                    .query_map([], news_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(news)
            })
            .await?;
        Ok(news)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn resolve_write<T>(outcome: Write<T>, label: impl FnOnce() -> String) -> Result<T> {
    match outcome {
        Write::Done(value) => Ok(value),
        Write::Duplicate => Err(AppError::Conflict(label())),
    }
}

fn source_from_row(row: &Row) -> rusqlite::Result<Source> {
    Ok(Source {
        id: row.get(0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        active: row.get::<_, i64>(3)? != 0,
    })
}

fn keyword_from_row(row: &Row) -> rusqlite::Result<Keyword> {
    Ok(Keyword {
        id: row.get(0)?,
        word: row.get(1)?,
        active: row.get::<_, i64>(2)? != 0,
    })
}

fn news_from_row(row: &Row) -> rusqlite::Result<NewsItem> {
    Ok(NewsItem {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        link: row.get(3)?,
        source_id: row.get(4)?,
        source_name: row.get(5)?,
        pub_date: row
            .get::<_, Option<String>>(6)?
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
        found_date: row
            .get::<_, Option<String>>(7)?
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
        keyword_id: row.get(8)?,
        keyword: row.get(9)?,
    })
}
