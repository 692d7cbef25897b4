//! DuckDuckGo search-result scraping (HTML endpoint, no API).
//!
//! Uses the static `html.duckduckgo.com` results page, which keeps a
//! stable class structure (`.result`, `.result__a`, `.result__snippet`).

use reqwest::header::USER_AGENT;
use scraper::{Html, Selector};
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument};

const SERP_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// One organic search result.
#[derive(Debug, Clone)]
pub struct SerpResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Scrape the top results for a query.
#[instrument(level = "info", skip_all, fields(%query))]
pub async fn scrape_duckduckgo(
    client: &reqwest::Client,
    query: &str,
) -> Result<Vec<SerpResult>, Box<dyn Error>> {
    let url = format!(
        "https://html.duckduckgo.com/html/?q={}",
        urlencoding::encode(query)
    );

    let html = client
        .get(&url)
        .header(USER_AGENT, SERP_USER_AGENT)
        .timeout(Duration::from_secs(10))
        .send()
        .await?
        .text()
        .await?;

    let results = parse_results(&html);
    info!(count = results.len(), "Scraped search results");
    Ok(results)
}

/// Parse the results page, keeping the top 5 external links.
pub fn parse_results(html: &str) -> Vec<SerpResult> {
    let document = Html::parse_document(html);
    let result_selector = Selector::parse(".result").unwrap();
    let link_selector = Selector::parse("a.result__a").unwrap();
    let snippet_selector = Selector::parse(".result__snippet").unwrap();

    let mut results = Vec::new();
    for result in document.select(&result_selector) {
        if results.len() >= 5 {
            break;
        }

        let Some(link) = result.select(&link_selector).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if href.is_empty() || href.contains("duckduckgo") {
            continue;
        }

        let title = link.text().collect::<Vec<_>>().join(" ").trim().to_string();
        if title.is_empty() {
            continue;
        }

        let snippet = result
            .select(&snippet_selector)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
            .unwrap_or_default();

        results.push(SerpResult {
            title,
            url: href.to_string(),
            snippet,
        });
    }

    results
}
