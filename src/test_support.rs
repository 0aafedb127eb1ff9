//! Fixtures shared by the unit tests.

use crate::config::{Config, DEFAULT_USER_AGENT};

/// Config pointing the proxy path at a mock server.
pub fn config_for(server_uri: &str) -> Config {
    Config {
        db_path: ":memory:".to_string(),
        refresh_interval_minutes: 20,
        fetch_timeout_secs: 2,
        proxy_url: format!("{}/proxy", server_uri),
        proxy_timeout_secs: 2,
        user_agent: DEFAULT_USER_AGENT.to_string(),
    }
}

/// Builds an RSS 2.0 document from `(title, link, description, pub_date)` rows.
pub fn rss(items: &[(&str, &str, &str, Option<&str>)]) -> String {
    let items: String = items
        .iter()
        .map(|(title, link, description, pub_date)| {
            let pub_date = pub_date
                .map(|d| format!("<pubDate>{}</pubDate>", d))
                .unwrap_or_default();
            format!(
                "<item><title>{}</title><link>{}</link><guid>{}</guid><description><![CDATA[{}]]></description>{}</item>",
                title, link, link, description, pub_date
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <link>http://example.com/</link>
    <description>Test description</description>
    {}
  </channel>
</rss>"#,
        items
    )
}
