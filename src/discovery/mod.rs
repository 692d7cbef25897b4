//! Topic discovery from RSS/Atom feeds, crawled sites, and search results.
//!
//! No external APIs: everything is local parsing and scraping. Each
//! discovered URL is de-duplicated within the run, topics are scored by
//! recency, and the engine returns them sorted best-first.

use crate::models::Topic;
use crate::utils::{normalize_whitespace, strip_tags};
use chrono::{DateTime, Local, Utc};
use std::collections::HashSet;
use std::error::Error;
use tracing::{info, instrument, warn};

pub mod crawl;
pub mod rss;
pub mod serp;

/// Discovers trending topics from multiple local sources.
///
/// The seen-URL set lives for one engine instance (one pipeline run);
/// concurrent runs get independent engines.
pub struct DiscoveryEngine {
    client: reqwest::Client,
    seen_urls: HashSet<String>,
    topics: Vec<Topic>,
}

impl DiscoveryEngine {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            seen_urls: HashSet::new(),
            topics: Vec::new(),
        }
    }

    /// Load a URL list file: one URL per line, blank lines and `#`
    /// comments ignored. A missing file logs a warning and yields nothing.
    pub async fn load_url_list(&self, path: &str) -> Vec<String> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => {
                let urls: Vec<String> = contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(String::from)
                    .collect();
                info!(count = urls.len(), path, "Loaded URL list");
                urls
            }
            Err(e) => {
                warn!(path, error = %e, "URL list file not found");
                Vec::new()
            }
        }
    }

    /// Parse one feed into topics, de-duplicating against URLs already
    /// seen in this run. Takes the top 10 entries per feed.
    #[instrument(level = "info", skip_all, fields(%feed_url))]
    pub async fn fetch_rss_feed(&mut self, feed_url: &str, category: &str) -> Vec<Topic> {
        let feed = match rss::fetch_feed(&self.client, feed_url).await {
            Ok(feed) => feed,
            Err(e) => {
                warn!(error = %e, "Error fetching RSS feed");
                return Vec::new();
            }
        };

        let source_name = feed
            .title
            .clone()
            .or_else(|| host_of(feed_url))
            .unwrap_or_else(|| feed_url.to_string());

        let mut topics = Vec::new();
        for entry in feed.entries.into_iter().take(10) {
            if entry.link.is_empty() || self.seen_urls.contains(&entry.link) {
                continue;
            }
            self.seen_urls.insert(entry.link.clone());

            topics.push(Topic {
                title_hint: take_chars(&entry.title, 100),
                short_excerpt: rewrite_excerpt(&entry.summary, 30),
                source_url: entry.link,
                published_time: entry.published.clone(),
                category: category.to_string(),
                trend_score: trend_score(entry.published.as_deref()),
                source_name: source_name.clone(),
            });
        }

        info!(count = topics.len(), source = %source_name, "Fetched topics from feed");
        topics
    }

    /// Scrape DuckDuckGo results for a query into topics.
    #[instrument(level = "info", skip_all, fields(%query))]
    pub async fn scrape_serp(&mut self, query: &str, category: &str) -> Vec<Topic> {
        let results = match serp::scrape_duckduckgo(&self.client, query).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "Error scraping search results");
                return Vec::new();
            }
        };

        let mut topics = Vec::new();
        for result in results {
            if self.seen_urls.contains(&result.url) {
                continue;
            }
            self.seen_urls.insert(result.url.clone());

            topics.push(Topic {
                title_hint: take_chars(&result.title, 100),
                short_excerpt: rewrite_excerpt(&result.snippet, 35),
                source_url: result.url,
                published_time: Some(Local::now().to_rfc3339()),
                category: category.to_string(),
                trend_score: 80.0,
                source_name: "DuckDuckGo".to_string(),
            });
        }

        info!(count = topics.len(), "Scraped topics from search results");
        topics
    }

    /// Run full discovery: RSS feeds, then site feed probing, then SERP
    /// queries. Topics come back sorted by trend score, best first.
    #[instrument(level = "info", skip_all)]
    pub async fn discover_all(
        &mut self,
        rss_file: &str,
        sites_file: &str,
        queries: &[String],
    ) -> Result<&[Topic], Box<dyn Error>> {
        for feed_url in self.load_url_list(rss_file).await {
            let topics = self.fetch_rss_feed(&feed_url, "tech").await;
            self.topics.extend(topics);
        }

        for site_url in self.load_url_list(sites_file).await {
            if let Some(feed_url) = crawl::discover_feed_url(&self.client, &site_url).await {
                let topics = self.fetch_rss_feed(&feed_url, "tech").await;
                self.topics.extend(topics);
            }
        }

        for query in queries {
            let topics = self.scrape_serp(query, "tech").await;
            self.topics.extend(topics);
        }

        self.topics
            .sort_by(|a, b| b.trend_score.total_cmp(&a.trend_score));
        info!(count = self.topics.len(), "Discovery complete");

        Ok(&self.topics)
    }

    /// The top `count` topics by trend score.
    pub fn top_topics(&self, count: usize) -> Vec<Topic> {
        self.topics.iter().take(count).cloned().collect()
    }
}

impl Default for DiscoveryEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate and normalize an excerpt for display: strip tags, collapse
/// whitespace, cap the word count with a trailing ellipsis when cut.
pub(crate) fn rewrite_excerpt(text: &str, max_words: usize) -> String {
    let cleaned = normalize_whitespace(&strip_tags(text));
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let mut result = words[..words.len().min(max_words)].join(" ");
    if words.len() > max_words {
        result.push_str("...");
    }
    result
}

/// Recency-based trend score: 100 minus two points per hour of age,
/// floored at zero. Unparseable dates get a neutral 75.
pub(crate) fn trend_score(published: Option<&str>) -> f64 {
    let Some(published) = published else {
        return 75.0;
    };

    let parsed = DateTime::parse_from_rfc2822(published)
        .or_else(|_| DateTime::parse_from_rfc3339(published));

    match parsed {
        Ok(dt) => {
            let age_hours = (Utc::now() - dt.with_timezone(&Utc)).num_seconds() as f64 / 3600.0;
            (100.0 - age_hours * 2.0).max(0.0)
        }
        Err(_) => 75.0,
    }
}

fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(String::from))
}

fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_rewrite_excerpt_strips_and_truncates() {
        let text = "<p>One   two <b>three</b> four five</p>";
        assert_eq!(rewrite_excerpt(text, 3), "One two three...");
        assert_eq!(rewrite_excerpt(text, 10), "One two three four five");
    }

    #[test]
    fn test_rewrite_excerpt_empty() {
        assert_eq!(rewrite_excerpt("", 30), "");
    }

    #[test]
    fn test_trend_score_recent_is_high() {
        let published = (Utc::now() - Duration::hours(1)).to_rfc3339();
        let score = trend_score(Some(&published));
        assert!(score > 90.0 && score <= 100.0);
    }

    #[test]
    fn test_trend_score_old_is_floored_at_zero() {
        let published = (Utc::now() - Duration::hours(200)).to_rfc3339();
        assert_eq!(trend_score(Some(&published)), 0.0);
    }

    #[test]
    fn test_trend_score_rfc2822() {
        let published = (Utc::now() - Duration::hours(2)).to_rfc2822();
        let score = trend_score(Some(&published));
        assert!(score > 90.0);
    }

    #[test]
    fn test_trend_score_unparseable_defaults() {
        assert_eq!(trend_score(Some("yesterday-ish")), 75.0);
        assert_eq!(trend_score(None), 75.0);
    }

    #[test]
    fn test_host_of() {
        assert_eq!(
            host_of("https://feeds.example.com/rss"),
            Some("feeds.example.com".to_string())
        );
        assert_eq!(host_of("not a url"), None);
    }

    #[tokio::test]
    async fn test_load_url_list_missing_file_is_empty() {
        let engine = DiscoveryEngine::new();
        let urls = engine.load_url_list("/nonexistent/feeds.txt").await;
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn test_load_url_list_skips_comments() {
        let dir = std::env::temp_dir().join("lna_discovery_test");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("feeds.txt");
        tokio::fs::write(
            &path,
            "# comment\nhttps://example.com/rss\n\n  https://example.org/feed  \n",
        )
        .await
        .unwrap();

        let engine = DiscoveryEngine::new();
        let urls = engine.load_url_list(path.to_str().unwrap()).await;
        assert_eq!(
            urls,
            vec!["https://example.com/rss", "https://example.org/feed"]
        );
    }
}
