//! Feed-URL probing for sites that don't advertise their feeds.
//!
//! Tries the conventional feed paths with cheap HEAD requests and returns
//! the first one that answers 2xx.

use std::time::Duration;
use tracing::{debug, info, instrument};

const FEED_PATH_CANDIDATES: [&str; 5] = ["rss", "feed", "feeds", "feed.xml", "rss.xml"];

/// Candidate feed URLs for a site base URL, in probe order.
pub fn candidate_feed_urls(base_url: &str) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    FEED_PATH_CANDIDATES
        .iter()
        .map(|path| format!("{base}/{path}"))
        .collect()
}

/// Probe a site's conventional feed paths; return the first that responds
/// successfully, or `None` when none do.
#[instrument(level = "info", skip_all, fields(%base_url))]
pub async fn discover_feed_url(client: &reqwest::Client, base_url: &str) -> Option<String> {
    for candidate in candidate_feed_urls(base_url) {
        let probe = client
            .head(&candidate)
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match probe {
            Ok(resp) if resp.status().is_success() => {
                info!(feed_url = %candidate, "Found feed URL");
                return Some(candidate);
            }
            Ok(resp) => debug!(url = %candidate, status = %resp.status(), "Probe rejected"),
            Err(e) => debug!(url = %candidate, error = %e, "Probe failed"),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_feed_urls() {
        let candidates = candidate_feed_urls("https://example.com/");
        assert_eq!(candidates.len(), 5);
        assert_eq!(candidates[0], "https://example.com/rss");
        assert_eq!(candidates[3], "https://example.com/feed.xml");
        // No double slash from the trailing slash on the base
        assert!(!candidates.iter().any(|c| c.contains("com//")));
    }
}
