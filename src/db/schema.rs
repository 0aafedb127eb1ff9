pub const SCHEMA: &str = r#"
-- feed sources
CREATE TABLE IF NOT EXISTS sources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1
);

-- keywords, matched in id order
CREATE TABLE IF NOT EXISTS keywords (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    word TEXT NOT NULL UNIQUE,
    active INTEGER NOT NULL DEFAULT 1
);

-- keyword matches; link is the dedup key
CREATE TABLE IF NOT EXISTS news (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT,
    link TEXT NOT NULL UNIQUE,
    source_id INTEGER REFERENCES sources(id),
    pub_date TEXT,
    found_date TEXT,
    keyword_id INTEGER REFERENCES keywords(id)
);

CREATE INDEX IF NOT EXISTS idx_news_found_date ON news(found_date DESC);
"#;
