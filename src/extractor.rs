//! Content extraction: fetch source pages, detect paywalls, and distill
//! fact-like bullet statements and a short excerpt from page text.
//!
//! The fact heuristics are deliberately crude and deterministic. Sentences
//! are split on `.`, `!`, or `?` followed by whitespace, which mis-splits
//! on abbreviations and decimal numbers; that is an accepted limitation,
//! kept for reproducibility rather than "fixed" with an NLP tokenizer.
//!
//! The pure operations ([`ContentExtractor::extract_facts`],
//! [`ContentExtractor::extract_excerpt`], [`ContentExtractor::detect_paywall`])
//! are total over their input domain: empty or degenerate text yields an
//! empty result, never an error.

use crate::models::ExtractedArticle;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::USER_AGENT;
use scraper::{Html, Selector};
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::utils::normalize_whitespace;

/// Browser-style UA so text-hostile servers serve the real page.
const FETCH_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

static SENTENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());
static CAPITALIZED_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+").unwrap());
static DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Default cap on extracted bullet facts per document.
pub const DEFAULT_MAX_FACTS: usize = 8;
/// Default word budget for the lead excerpt.
pub const DEFAULT_EXCERPT_WORDS: usize = 50;

/// Extracts fact bullets, excerpts, and links from source pages.
///
/// The paywall vocabulary is instance-owned configuration: multiple
/// extractors with different markers can coexist, and nothing here is
/// mutated after construction. Each extraction call is independent; the
/// de-duplication set lives inside the call, never on the instance.
pub struct ContentExtractor {
    client: reqwest::Client,
    paywall_indicators: Vec<&'static str>,
    max_facts: usize,
    excerpt_words: usize,
}

impl ContentExtractor {
    /// Create an extractor with the default paywall vocabulary.
    pub fn new(max_facts: usize, excerpt_words: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            paywall_indicators: vec![
                "subscribe",
                "paywall",
                "premium",
                "membership",
                "sign in",
                "register",
                "meter",
                "articles per month",
            ],
            max_facts,
            excerpt_words,
        }
    }

    /// Check for paywall indicators anywhere in the raw page text.
    ///
    /// Case-insensitive substring scan; a single match flags the document.
    /// This is a boolean signal, not a confidence score.
    pub fn detect_paywall(&self, page_text: &str) -> bool {
        let lower = page_text.to_lowercase();
        self.paywall_indicators
            .iter()
            .any(|indicator| lower.contains(indicator))
    }

    /// Extract up to `max_count` fact-like bullet statements from text.
    ///
    /// Candidate sentences are kept in source order. A sentence qualifies
    /// when its raw length exceeds 20 characters and it contains a digit
    /// run or a capitalized word beyond the sentence-initial token. Kept
    /// sentences are whitespace-normalized, truncated to 25 words (with a
    /// trailing period when truncation occurred), and de-duplicated within
    /// this call.
    pub fn extract_facts(&self, text: &str, max_count: usize) -> Vec<String> {
        let mut bullets: Vec<String> = Vec::new();

        for sentence in SENTENCE_RE.split(text) {
            let sentence = sentence.trim();
            if bullets.len() >= max_count {
                break;
            }
            if !is_fact_like(sentence) {
                continue;
            }
            let rewritten = truncate_to_words(&normalize_whitespace(sentence), 25);
            if !rewritten.is_empty() && !bullets.contains(&rewritten) {
                bullets.push(rewritten);
            }
        }

        bullets
    }

    /// Extract facts using the instance-configured cap.
    pub fn extract_default_facts(&self, text: &str) -> Vec<String> {
        self.extract_facts(text, self.max_facts)
    }

    /// Build a lead excerpt of at most `max_words` words.
    ///
    /// Leading sentences longer than 10 characters are concatenated with
    /// `". "` until the cumulative word count reaches the budget, then the
    /// joined string is hard-truncated to exactly `max_words` words. A
    /// trailing period marks the cut iff the pre-truncation word count
    /// exceeded the budget.
    pub fn extract_excerpt(&self, text: &str, max_words: usize) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut word_count = 0usize;

        for sentence in SENTENCE_RE.split(text) {
            let sentence = sentence.trim();
            if sentence.chars().count() > 10 {
                parts.push(sentence);
                word_count += sentence.split_whitespace().count();
                if word_count >= max_words {
                    break;
                }
            }
        }

        let excerpt = parts.join(". ");
        truncate_to_words(&excerpt, max_words)
    }

    /// Excerpt using the instance-configured word budget.
    pub fn extract_default_excerpt(&self, text: &str) -> String {
        self.extract_excerpt(text, self.excerpt_words)
    }

    /// Fetch a URL and extract its article content.
    ///
    /// Returns `Ok(None)` when the page yields no usable body text. A
    /// detected paywall is recorded on the result but does not abort
    /// extraction; exclusion of paywalled documents is the caller's call.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn extract(&self, url: &str) -> Result<Option<ExtractedArticle>, Box<dyn Error>> {
        let html = self
            .client
            .get(url)
            .header(USER_AGENT, FETCH_USER_AGENT)
            .timeout(Duration::from_secs(10))
            .send()
            .await?
            .text()
            .await?;

        let is_paywalled = self.detect_paywall(&html);
        if is_paywalled {
            warn!(%url, "Paywall detected");
        }

        let (title, main_text, links) = extract_page_text(&html, url);
        if main_text.is_empty() {
            warn!(%url, "No content extracted");
            return Ok(None);
        }

        let bullet_facts = self.extract_default_facts(&main_text);
        let main_excerpt = self.extract_default_excerpt(&main_text);

        info!(
            facts = bullet_facts.len(),
            excerpt_words = main_excerpt.split_whitespace().count(),
            "Extracted article"
        );

        Ok(Some(ExtractedArticle {
            title,
            main_excerpt,
            bullet_facts,
            important_links: links,
            full_text: main_text,
            is_paywalled,
            source_url: url.to_string(),
        }))
    }
}

/// Fact-like test: raw length > 20 characters AND (a digit run OR a
/// capitalized word token past the sentence-initial word).
///
/// The leading word of a sentence is capitalized in ordinary prose, so its
/// capitalization carries no factual signal and is ignored.
fn is_fact_like(sentence: &str) -> bool {
    if sentence.chars().count() <= 20 {
        return false;
    }
    if DIGIT_RE.is_match(sentence) {
        return true;
    }
    let beyond_first = match sentence.split_once(char::is_whitespace) {
        Some((_, rest)) => rest,
        None => return false,
    };
    CAPITALIZED_TOKEN_RE.is_match(beyond_first)
}

/// Keep the first `max_words` whitespace tokens, appending a period iff
/// tokens were dropped.
fn truncate_to_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut result = words[..words.len().min(max_words)].join(" ");
    if words.len() > max_words {
        result.push('.');
    }
    result
}

/// Pull the title, body text, and outbound links from an HTML page.
///
/// The body container is located by trying `article`, then `main`, then
/// divs whose class mentions content/article/post, then `body`. Paragraphs
/// shorter than 30 characters are dropped as navigation fragments.
pub fn extract_page_text(html: &str, base_url: &str) -> (String, String, Vec<String>) {
    let document = Html::parse_document(html);

    let h1_selector = Selector::parse("h1").unwrap();
    let title_selector = Selector::parse("title").unwrap();
    let p_selector = Selector::parse("p").unwrap();
    let a_selector = Selector::parse("a[href]").unwrap();
    let container_selectors = [
        Selector::parse("article").unwrap(),
        Selector::parse("main").unwrap(),
        Selector::parse(r#"div[class*="content"], div[class*="article"], div[class*="post"]"#)
            .unwrap(),
        Selector::parse("body").unwrap(),
    ];

    let title = document
        .select(&h1_selector)
        .next()
        .or_else(|| document.select(&title_selector).next())
        .map(|el| normalize_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .unwrap_or_default();

    let container = container_selectors
        .iter()
        .find_map(|sel| document.select(sel).next());

    let mut paragraphs = Vec::new();
    let mut links = Vec::new();

    if let Some(container) = container {
        for p in container.select(&p_selector).take(20) {
            let text = normalize_whitespace(&p.text().collect::<Vec<_>>().join(" "));
            if text.chars().count() > 30 {
                paragraphs.push(text);
            }
        }

        let base = url::Url::parse(base_url).ok();
        for a in container.select(&a_selector).take(10) {
            if let Some(href) = a.value().attr("href") {
                if href.starts_with("http") {
                    links.push(href.to_string());
                } else if let Some(resolved) =
                    base.as_ref().and_then(|b| b.join(href).ok())
                {
                    if resolved.scheme().starts_with("http") {
                        links.push(resolved.to_string());
                    }
                }
            }
        }
    }

    (title, paragraphs.join(" "), links)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ContentExtractor {
        ContentExtractor::new(DEFAULT_MAX_FACTS, DEFAULT_EXCERPT_WORDS)
    }

    #[test]
    fn test_extract_facts_empty_text() {
        assert!(extractor().extract_facts("", 8).is_empty());
    }

    #[test]
    fn test_extract_facts_short_text() {
        // Anything under 20 characters total can never qualify
        assert!(extractor().extract_facts("Too short. Ok 5.", 8).is_empty());
    }

    #[test]
    fn test_extract_facts_no_factual_signal() {
        let text = "this sentence has no digits or capitals anywhere at all. \
                    neither does this one, sadly for the filter.";
        assert!(extractor().extract_facts(text, 8).is_empty());
    }

    #[test]
    fn test_extract_facts_end_to_end_scenario() {
        let text = "Apple released 5 new phones in 2024. \
                    This is a filler sentence with no facts. \
                    Revenue grew by 12 percent this quarter.";
        let facts = extractor().extract_facts(text, 8);
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0], "Apple released 5 new phones in 2024");
        assert!(facts[1].starts_with("Revenue grew by 12 percent"));
        for fact in &facts {
            assert!(fact.split_whitespace().count() <= 25);
        }
    }

    #[test]
    fn test_extract_facts_initial_capital_does_not_count() {
        // Only the sentence-initial word is capitalized: no factual signal.
        let text = "This is a filler sentence with no facts inside it.";
        assert!(extractor().extract_facts(text, 8).is_empty());
    }

    #[test]
    fn test_extract_facts_mid_sentence_capital_counts() {
        let text = "The company known as Acme announced a merger agreement today.";
        let facts = extractor().extract_facts(text, 8);
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn test_extract_facts_respects_max_count() {
        let text = (1..=20)
            .map(|i| format!("Fact number {i} concerns a different measurable event."))
            .collect::<Vec<_>>()
            .join(" ");
        let facts = extractor().extract_facts(&text, 8);
        assert_eq!(facts.len(), 8);
    }

    #[test]
    fn test_extract_facts_truncates_to_25_words_with_period() {
        let long = format!(
            "Regulators counted {} items during the review process that lasted many weeks.",
            (1..=30).map(|i| i.to_string()).collect::<Vec<_>>().join(" ")
        );
        let facts = extractor().extract_facts(&long, 8);
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].split_whitespace().count(), 25);
        assert!(facts[0].ends_with('.'));
    }

    #[test]
    fn test_extract_facts_deduplicates() {
        let text = "Apple released 5 new phones in 2024. Apple released 5 new phones in 2024.";
        let facts = extractor().extract_facts(text, 8);
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn test_extract_facts_preserves_source_order() {
        let text = "Zebra Corp posted 9 percent growth this year. \
                    Apple Corp posted 3 percent growth this year.";
        let facts = extractor().extract_facts(text, 8);
        assert_eq!(facts.len(), 2);
        assert!(facts[0].starts_with("Zebra"));
        assert!(facts[1].starts_with("Apple"));
    }

    #[test]
    fn test_extract_facts_idempotent() {
        let text = "Apple released 5 new phones in 2024. Revenue grew by 12 percent.";
        let ex = extractor();
        assert_eq!(ex.extract_facts(text, 8), ex.extract_facts(text, 8));
    }

    #[test]
    fn test_extract_excerpt_within_budget_no_period() {
        let text = "A short opening sentence about markets";
        let excerpt = extractor().extract_excerpt(text, 50);
        assert_eq!(excerpt, "A short opening sentence about markets");
        assert!(!excerpt.ends_with('.'));
    }

    #[test]
    fn test_extract_excerpt_truncates_and_marks() {
        let text = "word ".repeat(80);
        let excerpt = extractor().extract_excerpt(&text, 50);
        assert_eq!(excerpt.split_whitespace().count(), 50);
        assert!(excerpt.ends_with('.'));
    }

    #[test]
    fn test_extract_excerpt_skips_fragments() {
        let text = "Ok now. Here is a properly substantial sentence about the topic at hand.";
        let excerpt = extractor().extract_excerpt(text, 50);
        assert!(!excerpt.contains("Ok now"));
        assert!(excerpt.starts_with("Here is a properly"));
    }

    #[test]
    fn test_extract_excerpt_empty_text() {
        assert_eq!(extractor().extract_excerpt("", 50), "");
    }

    #[test]
    fn test_extract_excerpt_idempotent() {
        let text = "The committee approved the budget after a long debate. \
                    Spending rises four percent next fiscal year.";
        let ex = extractor();
        assert_eq!(ex.extract_excerpt(text, 50), ex.extract_excerpt(text, 50));
    }

    #[test]
    fn test_detect_paywall_positive() {
        let ex = extractor();
        assert!(ex.detect_paywall("Please SUBSCRIBE to keep reading this story."));
        assert!(ex.detect_paywall("You have read 3 of 5 free articles per month."));
    }

    #[test]
    fn test_detect_paywall_negative() {
        assert!(!extractor().detect_paywall("Plain article body with no gating at all."));
    }

    #[test]
    fn test_extract_page_text_basic() {
        let html = r#"<html><head><title>Fallback</title></head><body>
            <article>
              <h1>Main Headline</h1>
              <p>This paragraph is long enough to survive the fragment filter easily.</p>
              <p>short</p>
              <a href="https://example.com/next">next</a>
              <a href="/relative">rel</a>
            </article></body></html>"#;
        let (title, text, links) = extract_page_text(html, "https://example.com/story");
        assert_eq!(title, "Main Headline");
        assert!(text.contains("fragment filter"));
        assert!(!text.contains("short"));
        assert!(links.contains(&"https://example.com/next".to_string()));
        assert!(links.contains(&"https://example.com/relative".to_string()));
    }

    #[test]
    fn test_extract_page_text_title_fallback() {
        let html = "<html><head><title>Doc Title</title></head><body><p>Body paragraph that is comfortably long enough.</p></body></html>";
        let (title, text, _) = extract_page_text(html, "https://example.com");
        assert_eq!(title, "Doc Title");
        assert!(text.contains("Body paragraph"));
    }
}
