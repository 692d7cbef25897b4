//! Data models for discovered topics, extracted sources, and composed articles.
//!
//! This module defines the core data structures passed between pipeline
//! phases:
//! - [`Topic`]: A trending story discovered from a feed or search results
//! - [`ExtractedArticle`]: Facts and excerpt pulled from a source page
//! - [`ComposedArticle`]: A generated article with full SEO metadata
//! - [`SourceRef`]: Name/URL attribution for a source
//! - [`QaResult`]: The verdict of the QA validator
//!
//! Everything here serializes with serde so drafts and session records can
//! be persisted as JSON.

use serde::{Deserialize, Serialize};

/// A trending news topic discovered from RSS feeds, crawled sites, or
/// search result pages.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Topic {
    /// Headline hint, truncated to 100 characters.
    pub title_hint: String,
    /// Rewritten short excerpt, roughly 20-40 words.
    pub short_excerpt: String,
    /// URL of the story this topic points at.
    pub source_url: String,
    /// Publication time as reported by the feed, if any.
    pub published_time: Option<String>,
    /// Coarse category: "tech", "ai", "crypto", or "business".
    pub category: String,
    /// Recency-based trend score in the 0-100 range.
    pub trend_score: f64,
    /// Human-readable name of the originating source.
    pub source_name: String,
}

impl Topic {
    /// Extract the registrable domain of the source URL, e.g.
    /// `"https://lite.cnn.com/article"` -> `"cnn"`.
    pub fn source_domain(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.source_url).ok()?;
        let host = parsed.host_str()?;
        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() >= 2 {
            Some(parts[parts.len() - 2].to_string())
        } else {
            None
        }
    }
}

/// Article data extracted from a single source page.
///
/// Produced by the extraction phase and consumed by the composer. The
/// `full_text` field is retained so the QA validator can compare the
/// composed article against the material it was derived from.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractedArticle {
    /// Page title (from `<h1>` or `<title>`).
    pub title: String,
    /// Rewritten lead excerpt, at most 50 words.
    pub main_excerpt: String,
    /// Fact-like bullet statements, each at most 25 words.
    pub bullet_facts: Vec<String>,
    /// Absolute outbound links found in the article body.
    pub important_links: Vec<String>,
    /// The full extracted body text, used for source comparison.
    pub full_text: String,
    /// Whether a paywall marker was detected on the page.
    pub is_paywalled: bool,
    /// The URL the page was fetched from.
    pub source_url: String,
}

/// Name and URL attribution for a source used in an article.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceRef {
    pub name: String,
    pub url: String,
}

/// A composed article with all SEO metadata, ready for QA and output.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComposedArticle {
    /// Headline, truncated to 100 characters.
    pub title: String,
    /// Article body as an HTML fragment (`<h2>`, `<p>`, `<ul>`/`<li>`).
    pub article_html: String,
    /// 40-60 word summary.
    pub summary: String,
    /// Whitespace-token count of the article body.
    pub word_count: usize,
    /// 5-8 topic tags.
    pub tags: Vec<String>,
    /// URL slug derived from the title.
    pub slug: String,
    /// SEO title, at most 60 characters.
    pub seo_title: String,
    /// Meta description, 120-155 characters.
    pub meta_description: String,
    /// 8-12 SEO keywords.
    pub keywords: Vec<String>,
    /// Main 16:9 image generation prompt.
    pub image_prompt_main: String,
    /// First alternate image prompt.
    pub image_prompt_alt1: String,
    /// Second alternate image prompt.
    pub image_prompt_alt2: String,
    /// Image alt text, at most 120 characters.
    pub alt_text: String,
    /// Sources the article was derived from.
    pub sources: Vec<SourceRef>,
    /// Call-to-action line.
    pub cta: String,
    /// One-sentence editorial take.
    pub our_take: String,
    /// RFC 3339 timestamp of composition.
    pub published_at: String,
}

/// The verdict of a full QA validation run.
///
/// `passed` is true iff every individual check passed. All checks always
/// run, so `issues` may name several independent problems at once. The
/// result is created fresh per validation call and never mutated after
/// being returned.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QaResult {
    /// Conjunction of all individual check outcomes.
    pub passed: bool,
    /// Human-readable issue strings, in check order: word count, overlap,
    /// safety, structural.
    pub issues: Vec<String>,
    /// Whitespace-token count of the validated article text.
    pub word_count: usize,
    /// True iff no banned or spam-indicator term was found.
    pub is_adsense_safe: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_source_domain() {
        let topic = Topic {
            title_hint: "Test".to_string(),
            short_excerpt: String::new(),
            source_url: "https://lite.cnn.com/2025/05/06/article".to_string(),
            published_time: None,
            category: "tech".to_string(),
            trend_score: 80.0,
            source_name: "CNN".to_string(),
        };
        assert_eq!(topic.source_domain(), Some("cnn".to_string()));
    }

    #[test]
    fn test_topic_source_domain_invalid_url() {
        let topic = Topic {
            title_hint: "Test".to_string(),
            short_excerpt: String::new(),
            source_url: "not a url".to_string(),
            published_time: None,
            category: "tech".to_string(),
            trend_score: 0.0,
            source_name: "??".to_string(),
        };
        assert_eq!(topic.source_domain(), None);
    }

    #[test]
    fn test_qa_result_serialization() {
        let result = QaResult {
            passed: false,
            issues: vec![
                "Word count 799 < 800".to_string(),
                "Missing Sources section".to_string(),
            ],
            word_count: 799,
            is_adsense_safe: true,
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"passed\":false"));
        assert!(json.contains("\"is_adsense_safe\":true"));

        let back: QaResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.issues.len(), 2);
        assert_eq!(back.issues[0], "Word count 799 < 800");
        assert_eq!(back.word_count, 799);
    }

    #[test]
    fn test_extracted_article_roundtrip() {
        let article = ExtractedArticle {
            title: "Apple ships new phones".to_string(),
            main_excerpt: "Apple released 5 new phones in 2024".to_string(),
            bullet_facts: vec!["Apple released 5 new phones in 2024".to_string()],
            important_links: vec!["https://example.com/related".to_string()],
            full_text: "Apple released 5 new phones in 2024.".to_string(),
            is_paywalled: false,
            source_url: "https://example.com/apple".to_string(),
        };

        let json = serde_json::to_string(&article).unwrap();
        let back: ExtractedArticle = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bullet_facts.len(), 1);
        assert!(!back.is_paywalled);
    }

    #[test]
    fn test_composed_article_serialization() {
        let article = ComposedArticle {
            title: "Test Article".to_string(),
            article_html: "<h1>Test Article</h1><p>Body</p>".to_string(),
            summary: "A summary".to_string(),
            word_count: 2,
            tags: vec!["tech".to_string(), "news".to_string()],
            slug: "test-article".to_string(),
            seo_title: "Test Article | Latest News".to_string(),
            meta_description: "Test Article. Read the latest insights.".to_string(),
            keywords: vec!["tech".to_string()],
            image_prompt_main: "16:9 illustration".to_string(),
            image_prompt_alt1: "infographic".to_string(),
            image_prompt_alt2: "abstract".to_string(),
            alt_text: "Illustration".to_string(),
            sources: vec![SourceRef {
                name: "Example".to_string(),
                url: "https://example.com".to_string(),
            }],
            cta: "Subscribe for daily updates.".to_string(),
            our_take: "A pivotal moment.".to_string(),
            published_at: "2025-05-06T20:30:00Z".to_string(),
        };

        let json = serde_json::to_string(&article).unwrap();
        assert!(json.contains("test-article"));
        assert!(json.contains("https://example.com"));
    }
}
