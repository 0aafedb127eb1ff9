use std::time::Duration;

use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL};
use reqwest::Client;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{Feed, FeedItem};

use super::proxy::ProxyResponse;

const ACCEPT_FEEDS: &str = "application/rss+xml, application/xml, text/xml, */*";

/// Acquires feeds by parsing them directly, falling back to the JSON proxy.
pub struct FeedFetcher {
    direct: Client,
    proxy: Client,
    proxy_url: String,
}

impl FeedFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_FEEDS));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let direct = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        let proxy = Client::builder()
            .timeout(Duration::from_secs(config.proxy_timeout_secs))
            .build()?;

        Ok(Self {
            direct,
            proxy,
            proxy_url: config.proxy_url.clone(),
        })
    }

    /// Fetches `url`, trying the proxy exactly once if the direct path fails.
    ///
    /// Returns [`AppError::Fetch`] carrying both causes when neither path works.
    pub async fn fetch(&self, url: &str) -> Result<Feed> {
        let direct_err = match self.fetch_direct(url).await {
            Ok(feed) => return Ok(feed),
            Err(e) => e,
        };
        tracing::debug!("Direct fetch of {} failed: {}", url, direct_err);
        tracing::info!("Using proxy for {}", url);

        match self.fetch_via_proxy(url).await {
            Ok(feed) => {
                tracing::info!("Proxy returned {} items for {}", feed.items.len(), url);
                Ok(feed)
            }
            Err(proxy_err) => Err(AppError::Fetch {
                direct: direct_err.to_string(),
                proxy: proxy_err.to_string(),
            }),
        }
    }

    async fn fetch_direct(&self, url: &str) -> Result<Feed> {
        let response = self.direct.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to fetch feed: HTTP {}", response.status()).into());
        }

        let bytes = response.bytes().await?;
        let parsed = parser::parse(&bytes[..])?;

        Ok(Feed {
            title: parsed.title.map(|t| t.content),
            description: parsed.description.map(|d| d.content),
            link: parsed.links.first().map(|l| l.href.clone()),
            items: parsed.entries.into_iter().map(item_from_entry).collect(),
        })
    }

    async fn fetch_via_proxy(&self, url: &str) -> Result<Feed> {
        let response: ProxyResponse = self
            .proxy
            .get(&self.proxy_url)
            .query(&[("rss_url", url)])
            .send()
            .await?
            .json()
            .await?;

        response.into_feed()
    }
}

fn item_from_entry(entry: Entry) -> FeedItem {
    let content = entry.content.and_then(|c| c.body);
    let summary = entry.summary.map(|s| s.content);

    // Plain-text rendition of the summary, or of the content when there is none
    let snippet = summary
        .as_deref()
        .or(content.as_deref())
        .and_then(plain_text);

    FeedItem {
        title: entry.title.map(|t| t.content).unwrap_or_default(),
        link: entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default(),
        pub_date: entry.published.or(entry.updated),
        content,
        snippet,
        guid: Some(entry.id).filter(|id| !id.is_empty()),
    }
}

fn plain_text(html: &str) -> Option<String> {
    // Wide enough that html2text never wraps, then whitespace is collapsed
    let text = html2text::from_read(html.as_bytes(), 10_000).ok()?;
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    Some(text)
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;
    use crate::config::DEFAULT_USER_AGENT;
    use crate::test_support::{config_for, rss};

    const PROXY_OK: &str = r#"{
        "status": "ok",
        "feed": {"title": "Proxied", "link": "https://a.example", "description": ""},
        "items": [{"title": "Via proxy", "link": "https://a.example/p1", "pubDate": "2024-10-21 07:28:00",
                   "description": "snippet", "content": "<b>snippet</b>", "guid": "p1"}]
    }"#;

    fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
        request.headers.get(name).and_then(|v| v.to_str().ok())
    }

    async fn mount_feed(server: &MockServer, status: u16, body: String) {
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(
                ResponseTemplate::new(status)
                    .insert_header("content-type", "application/rss+xml")
                    .set_body_string(body),
            )
            .mount(server)
            .await;
    }

    async fn mount_proxy(server: &MockServer, feed_url: &str, body: &str, calls: u64) {
        Mock::given(method("GET"))
            .and(path("/proxy"))
            .and(query_param("rss_url", feed_url))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string(body.to_string()),
            )
            .expect(calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn direct_feed_is_parsed_without_proxy() {
        let server = MockServer::start().await;
        let feed_url = format!("{}/feed", server.uri());
        mount_feed(
            &server,
            200,
            rss(&[
                ("Item 1", "http://example.com/1", "<p>First paragraph</p>", Some("Mon, 21 Oct 2024 07:28:00 GMT")),
                ("Item 2", "http://example.com/2", "Second", None),
            ]),
        )
        .await;
        mount_proxy(&server, &feed_url, PROXY_OK, 0).await;

        let fetcher = FeedFetcher::new(&config_for(&server.uri())).unwrap();
        let feed = fetcher.fetch(&feed_url).await.unwrap();

        assert_eq!(feed.title.as_deref(), Some("Test Feed"));
        assert_eq!(feed.description.as_deref(), Some("Test description"));
        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].guid.as_deref(), Some("http://example.com/1"));
        assert_eq!(feed.items[0].title, "Item 1");
        assert_eq!(feed.items[0].link, "http://example.com/1");
        assert_eq!(feed.items[0].snippet.as_deref(), Some("First paragraph"));
        assert!(feed.items[0].pub_date.is_some());
        assert!(feed.items[1].pub_date.is_none());
    }

    #[tokio::test]
    async fn http_error_falls_back_to_proxy_once() {
        let server = MockServer::start().await;
        let feed_url = format!("{}/feed", server.uri());
        mount_feed(&server, 500, String::new()).await;
        mount_proxy(&server, &feed_url, PROXY_OK, 1).await;

        let fetcher = FeedFetcher::new(&config_for(&server.uri())).unwrap();
        let feed = fetcher.fetch(&feed_url).await.unwrap();

        assert_eq!(feed.title.as_deref(), Some("Proxied"));
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].link, "https://a.example/p1");
    }

    #[tokio::test]
    async fn direct_request_looks_like_a_browser() {
        let server = MockServer::start().await;
        let feed_url = format!("{}/feed", server.uri());

        // The agent contains commas, so compare whole header values
        let browser_headers = |request: &Request| {
            header(request, "user-agent") == Some(DEFAULT_USER_AGENT)
                && header(request, "accept") == Some(ACCEPT_FEEDS)
                && header(request, "cache-control") == Some("no-cache")
        };
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(browser_headers)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(rss(&[("Item", "http://example.com/1", "", None)])),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_proxy(&server, &feed_url, PROXY_OK, 0).await;

        let fetcher = FeedFetcher::new(&config_for(&server.uri())).unwrap();
        let feed = fetcher.fetch(&feed_url).await.unwrap();

        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].link, "http://example.com/1");
    }

    #[tokio::test]
    async fn slow_direct_fetch_times_out_to_proxy() {
        let server = MockServer::start().await;
        let feed_url = format!("{}/feed", server.uri());
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(rss(&[("Late", "http://example.com/late", "", None)]))
                    .set_delay(Duration::from_secs(4)),
            )
            .mount(&server)
            .await;
        mount_proxy(&server, &feed_url, PROXY_OK, 1).await;

        let mut config = config_for(&server.uri());
        config.fetch_timeout_secs = 1;
        let fetcher = FeedFetcher::new(&config).unwrap();
        let feed = fetcher.fetch(&feed_url).await.unwrap();

        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].link, "https://a.example/p1");
    }

    #[tokio::test]
    async fn unparsable_body_falls_back_to_proxy() {
        let server = MockServer::start().await;
        let feed_url = format!("{}/feed", server.uri());
        mount_feed(&server, 200, "<html><body>Not a feed</body></html>".to_string()).await;
        mount_proxy(&server, &feed_url, PROXY_OK, 1).await;

        let fetcher = FeedFetcher::new(&config_for(&server.uri())).unwrap();
        let feed = fetcher.fetch(&feed_url).await.unwrap();

        assert_eq!(feed.items[0].title, "Via proxy");
    }

    #[tokio::test]
    async fn both_paths_failing_is_a_fetch_error() {
        let server = MockServer::start().await;
        let feed_url = format!("{}/feed", server.uri());
        mount_feed(&server, 404, String::new()).await;
        mount_proxy(
            &server,
            &feed_url,
            r#"{"status": "error", "message": "Cannot download this RSS feed"}"#,
            1,
        )
        .await;

        let fetcher = FeedFetcher::new(&config_for(&server.uri())).unwrap();
        let err = fetcher.fetch(&feed_url).await.unwrap_err();

        match err {
            AppError::Fetch { direct, proxy } => {
                assert!(direct.contains("404"));
                assert!(proxy.contains("Cannot download"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
