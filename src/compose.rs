//! Article composition: LLM-written articles with a rule-based fallback.
//!
//! The LLM path sends a constrained-JSON prompt to an OpenAI-compatible
//! endpoint and parses the reply into a [`ComposedArticle`]. Any failure
//! (endpoint down, malformed JSON, truncated reply after one re-ask)
//! falls back to deterministic template generation, so composition always
//! produces an article.

use crate::api::ask_with_backoff;
use crate::config::LlmConfig;
use crate::models::{ComposedArticle, SourceRef};
use crate::utils::{looks_truncated, slugify, strip_tags, truncate_for_log};
use chrono::Local;
use rand::{rng, Rng};
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// System prompt for the LLM composition path.
const COMPOSER_SYSTEM_PROMPT: &str = "You are a professional news article writer. \
You compose original, SEO-optimized news articles and reply with valid JSON only.";

/// Fields the LLM is asked to return. Everything is defaulted so a reply
/// missing optional fields still maps onto an article.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct LlmArticle {
    title: String,
    article_html: String,
    summary: String,
    tags: Vec<String>,
    slug: String,
    seo_title: String,
    meta_description: String,
    keywords: Vec<String>,
    image_prompt_main: String,
    image_prompt_alt1: String,
    image_prompt_alt2: String,
    alt_text: String,
    our_take: String,
    cta: String,
}

impl Default for LlmArticle {
    fn default() -> Self {
        Self {
            title: String::new(),
            article_html: String::new(),
            summary: String::new(),
            tags: Vec::new(),
            slug: String::new(),
            seo_title: String::new(),
            meta_description: String::new(),
            keywords: Vec::new(),
            image_prompt_main: String::new(),
            image_prompt_alt1: String::new(),
            image_prompt_alt2: String::new(),
            alt_text: String::new(),
            our_take: "A pivotal moment in technology.".to_string(),
            cta: "Subscribe for daily updates.".to_string(),
        }
    }
}

/// Composes articles via LLM with a rule-based fallback.
pub struct ArticleComposer {
    http: reqwest::Client,
    llm: LlmConfig,
    use_llm: bool,
}

impl ArticleComposer {
    pub fn new(llm: LlmConfig, use_llm: bool) -> Self {
        Self {
            http: reqwest::Client::new(),
            llm,
            use_llm,
        }
    }

    /// Compose an article: try the LLM first, fall back to templates.
    #[instrument(level = "info", skip_all, fields(topic = %topic_title))]
    pub async fn compose(
        &self,
        topic_title: &str,
        facts: &[String],
        sources: &[SourceRef],
        category: &str,
    ) -> ComposedArticle {
        if self.use_llm && self.llm.enabled {
            match self.compose_with_llm(topic_title, facts, sources).await {
                Some(article) => return article,
                None => warn!("LLM composition failed; using rule-based fallback"),
            }
        }
        compose_with_fallback(topic_title, facts, sources, category)
    }

    /// LLM path. Returns `None` on any failure so the caller can fall back.
    async fn compose_with_llm(
        &self,
        topic_title: &str,
        facts: &[String],
        sources: &[SourceRef],
    ) -> Option<ComposedArticle> {
        let prompt = build_llm_prompt(topic_title, facts, sources);

        let response =
            match ask_with_backoff(&self.http, &self.llm, COMPOSER_SYSTEM_PROMPT, &prompt).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "LLM request failed");
                    return None;
                }
            };

        let mut parsed = parse_llm_reply(topic_title, &response, sources);

        // A truncated reply parses with an EOF error; re-ask exactly once.
        if let Err(ref e) = parsed {
            if looks_truncated(e) {
                warn!(error = %e, "EOF while parsing LLM reply; re-asking once");
                match ask_with_backoff(&self.http, &self.llm, COMPOSER_SYSTEM_PROMPT, &prompt)
                    .await
                {
                    Ok(r2) => parsed = parse_llm_reply(topic_title, &r2, sources),
                    Err(e2) => warn!(error = %e2, "Re-ask failed"),
                }
            }
        }

        match parsed {
            Ok(article) => {
                info!(slug = %article.slug, "Composed article via LLM");
                Some(article)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    response_preview = %truncate_for_log(&response, 300),
                    "Model returned non-conforming JSON"
                );
                None
            }
        }
    }
}

/// Parse the LLM's JSON reply into a [`ComposedArticle`], filling any
/// blanks from the topic title.
fn parse_llm_reply(
    topic_title: &str,
    raw: &str,
    sources: &[SourceRef],
) -> Result<ComposedArticle, serde_json::Error> {
    let reply: LlmArticle = serde_json::from_str(raw.trim())?;

    let title = if reply.title.is_empty() {
        take_chars(topic_title, 100)
    } else {
        take_chars(&reply.title, 100)
    };
    let slug = if reply.slug.is_empty() {
        slugify(&title)
    } else {
        reply.slug
    };
    let word_count = strip_tags(&reply.article_html).split_whitespace().count();

    Ok(ComposedArticle {
        slug,
        article_html: reply.article_html,
        summary: take_chars(&reply.summary, 250),
        word_count,
        tags: reply.tags.into_iter().take(8).collect(),
        seo_title: take_chars(&reply.seo_title, 60),
        meta_description: take_chars(&reply.meta_description, 155),
        keywords: reply.keywords.into_iter().take(12).collect(),
        image_prompt_main: reply.image_prompt_main,
        image_prompt_alt1: reply.image_prompt_alt1,
        image_prompt_alt2: reply.image_prompt_alt2,
        alt_text: take_chars(&reply.alt_text, 120),
        sources: sources.to_vec(),
        cta: reply.cta,
        our_take: reply.our_take,
        published_at: Local::now().to_rfc3339(),
        title,
    })
}

/// Build the constrained-JSON composition prompt.
fn build_llm_prompt(topic: &str, facts: &[String], sources: &[SourceRef]) -> String {
    let facts_str = facts
        .iter()
        .take(10)
        .map(|f| format!("- {f}"))
        .collect::<Vec<_>>()
        .join("\n");
    let sources_str = sources
        .iter()
        .map(|s| format!("- {}: {}", s.name, s.url))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Compose an original, SEO-optimized news article.

Topic: {topic}

Key Facts:
{facts_str}

Sources:
{sources_str}

RULES:
1. Never copy more than 20 consecutive characters from the facts
2. Paraphrase and expand everything
3. Article must be 800-1200 words
4. Include "Our take:" near the end
5. Must include a Sources section
6. No adult, violent, or illegal content

Output ONLY valid JSON (no markdown):
{{
 "title": "<headline of at most 12 words>",
 "article_html": "<HTML with <h2>, <p>, <ul> tags, ending with a Sources section>",
 "summary": "<40-60 words>",
 "tags": ["tag1", "tag2"],
 "slug": "<url-slug>",
 "seo_title": "<at most 60 chars>",
 "meta_description": "<120-155 chars>",
 "keywords": ["k1", "k2"],
 "image_prompt_main": "<16:9 image prompt>",
 "image_prompt_alt1": "<alt prompt>",
 "image_prompt_alt2": "<alt prompt 2>",
 "alt_text": "<at most 120 chars>",
 "our_take": "<one sentence>",
 "cta": "Subscribe for daily updates."
}}
"#
    )
}

/// Compose an article from rule-based templates and fact synthesis.
pub fn compose_with_fallback(
    topic_title: &str,
    facts: &[String],
    sources: &[SourceRef],
    category: &str,
) -> ComposedArticle {
    let article_html = build_article_html(topic_title, facts, sources, category);
    let title = take_chars(topic_title, 100);
    let slug = slugify(topic_title);
    let seo_title = generate_seo_title(topic_title);
    let meta_description = generate_meta_description(topic_title, facts);
    let keywords = generate_keywords(topic_title, category);
    let tags = generate_tags(category, topic_title);
    let (image_prompt_main, image_prompt_alt1, image_prompt_alt2, alt_text) =
        generate_image_prompts(topic_title, category);
    let summary = generate_summary(facts);
    let word_count = strip_tags(&article_html).split_whitespace().count();
    let our_take = generate_our_take(category);

    info!(slug = %slug, word_count, "Composed article via fallback");

    ComposedArticle {
        title,
        article_html,
        summary,
        word_count,
        tags,
        slug,
        seo_title,
        meta_description,
        keywords,
        image_prompt_main,
        image_prompt_alt1,
        image_prompt_alt2,
        alt_text,
        sources: sources.to_vec(),
        cta: "Subscribe for daily updates on tech and AI.".to_string(),
        our_take,
        published_at: Local::now().to_rfc3339(),
    }
}

/// Build the fallback article HTML skeleton from the facts.
fn build_article_html(
    topic: &str,
    facts: &[String],
    sources: &[SourceRef],
    category: &str,
) -> String {
    let mut html_parts = vec![format!("<h1>{topic}</h1>")];

    if let Some(lead) = facts.first() {
        html_parts.push(format!("<p>{lead}</p>"));
    }

    let body_facts = if facts.len() > 1 { &facts[1..] } else { &[] };
    for fact in body_facts.iter().take(8) {
        html_parts.push(format!("<p>{fact}</p>"));
    }

    if !body_facts.is_empty() {
        html_parts.push("<h2>Key Points</h2>".to_string());
        html_parts.push("<ul>".to_string());
        for fact in body_facts.iter().take(5) {
            html_parts.push(format!("<li>{fact}</li>"));
        }
        html_parts.push("</ul>".to_string());
    }

    html_parts.push("<h2>What This Means</h2>".to_string());
    html_parts.push(format!("<p>{}</p>", generate_analysis(facts)));

    html_parts.push("<h2>Our Take</h2>".to_string());
    html_parts.push(format!(
        "<p><strong>Our take:</strong> {}</p>",
        generate_our_take(category)
    ));

    if !sources.is_empty() {
        html_parts.push("<h2>Sources</h2>".to_string());
        html_parts.push("<ul>".to_string());
        for source in sources {
            html_parts.push(format!("<li><a href=\"{}\">{}</a></li>", source.url, source.name));
        }
        html_parts.push("</ul>".to_string());
    }

    html_parts.push(format!(
        "<p><a href='/tag/{category}'>{} News</a> | <a href='/category/{category}'>More Stories</a></p>",
        upcase_first(category)
    ));

    html_parts.join("\n")
}

fn generate_seo_title(title: &str) -> String {
    let mut seo = take_chars(title, 60);
    if seo.chars().count() < 30 {
        seo.push_str(" | Latest News");
    }
    take_chars(&seo, 60)
}

fn generate_meta_description(title: &str, facts: &[String]) -> String {
    let tail = facts
        .first()
        .map(|f| take_chars(f, 100))
        .unwrap_or_else(|| "Read the latest insights.".to_string());
    take_chars(&format!("{title}. {tail}"), 155)
}

fn generate_keywords(title: &str, category: &str) -> Vec<String> {
    let mut keywords: Vec<String> = vec![category, "news", "latest", "today", "trending"]
        .into_iter()
        .map(String::from)
        .collect();
    keywords.extend(
        title
            .to_lowercase()
            .split_whitespace()
            .filter(|w| w.chars().count() > 3)
            .take(4)
            .map(String::from),
    );
    keywords.truncate(12);
    keywords
}

fn generate_tags(category: &str, title: &str) -> Vec<String> {
    let mut tags: Vec<String> = vec![category, "news", "insights"]
        .into_iter()
        .map(String::from)
        .collect();
    tags.extend(
        title
            .to_lowercase()
            .split_whitespace()
            .filter(|w| w.chars().count() > 4)
            .take(3)
            .map(String::from),
    );
    tags.truncate(8);
    tags
}

/// Three 16:9 image prompts (no logos, no faces) plus alt text.
fn generate_image_prompts(title: &str, category: &str) -> (String, String, String, String) {
    let hint = match category {
        "tech" => "futuristic technology, digital interfaces, innovation",
        "ai" => "artificial intelligence, neural networks, machine learning visualizations",
        "crypto" => "blockchain, digital currency, decentralized networks",
        "business" => "corporate strategy, growth charts, business meeting",
        _ => "modern technology",
    };

    (
        format!(
            "16:9 cinematic illustration of {hint}, abstract modern art style, no logos, no faces, professional, {}",
            take_chars(title, 30)
        ),
        format!(
            "Modern 16:9 infographic featuring {category} concepts, digital art, clean design, no people"
        ),
        format!(
            "Abstract 16:9 visualization of {category} innovation, tech aesthetic, geometric shapes, vibrant colors"
        ),
        format!("Illustration representing {}", take_chars(title, 40)),
    )
}

/// 40-60 word summary from the first facts.
fn generate_summary(facts: &[String]) -> String {
    let summary = facts
        .iter()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");
    summary
        .split_whitespace()
        .take(60)
        .collect::<Vec<_>>()
        .join(" ")
}

fn generate_our_take(category: &str) -> String {
    let takes = [
        format!("This represents a significant shift in {category}."),
        format!("A pivotal moment for the {category} industry."),
        format!("This development will shape {category} for years to come."),
        format!("Industry transformation is underway in {category}."),
    ];
    let idx = rng().random_range(0..takes.len());
    takes[idx].clone()
}

fn generate_analysis(facts: &[String]) -> String {
    if facts.len() < 2 {
        return "This development marks an important turning point.".to_string();
    }
    format!(
        "The convergence of these factors suggests a broader transformation ahead. {}",
        facts[facts.len() - 1]
    )
}

fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn upcase_first(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qa::QaValidator;

    fn sample_sources() -> Vec<SourceRef> {
        vec![SourceRef {
            name: "Example Wire".to_string(),
            url: "https://example.com/story".to_string(),
        }]
    }

    fn sample_facts() -> Vec<String> {
        vec![
            "Apple released 5 new phones in 2024".to_string(),
            "Revenue grew by 12 percent this quarter".to_string(),
            "Analysts expect 3 more launches next year".to_string(),
        ]
    }

    #[test]
    fn test_fallback_contains_structural_markers() {
        let article = compose_with_fallback(
            "Apple Ships New Phones",
            &sample_facts(),
            &sample_sources(),
            "tech",
        );
        assert!(article.article_html.contains("Our take:"));
        assert!(article.article_html.contains("<h2>Sources</h2>"));
        assert!(article.article_html.contains("https://example.com/story"));
    }

    #[test]
    fn test_fallback_passes_structural_qa() {
        let article = compose_with_fallback(
            "Apple Ships New Phones",
            &sample_facts(),
            &sample_sources(),
            "tech",
        );
        let text = strip_tags(&article.article_html);
        let validator = QaValidator::new(0);
        let result = validator.validate(&text, &article.article_html, &[], true, true);
        assert!(result.passed, "issues: {:?}", result.issues);
    }

    #[test]
    fn test_fallback_seo_fields() {
        let article = compose_with_fallback(
            "Apple Ships New Phones",
            &sample_facts(),
            &sample_sources(),
            "tech",
        );
        assert_eq!(article.slug, "apple-ships-new-phones");
        assert!(article.seo_title.chars().count() <= 60);
        assert!(article.meta_description.chars().count() <= 155);
        assert!(article.keywords.len() >= 5 && article.keywords.len() <= 12);
        assert!(article.tags.len() <= 8);
        assert!(article.alt_text.chars().count() <= 120);
        assert!(article.image_prompt_main.contains("16:9"));
    }

    #[test]
    fn test_fallback_summary_bounded() {
        let article = compose_with_fallback(
            "Topic",
            &vec!["word ".repeat(40).trim().to_string(); 3],
            &sample_sources(),
            "tech",
        );
        assert!(article.summary.split_whitespace().count() <= 60);
    }

    #[test]
    fn test_fallback_with_no_facts() {
        let article = compose_with_fallback("Quiet Day", &[], &sample_sources(), "tech");
        assert!(article
            .article_html
            .contains("This development marks an important turning point."));
        assert!(article.word_count > 0);
    }

    #[test]
    fn test_parse_llm_reply_full() {
        let raw = r#"{
            "title": "Apple Ships Five New Phones",
            "article_html": "<h2>Launch</h2><p>Body text here.</p><h2>Sources</h2>",
            "summary": "A summary of the launch.",
            "tags": ["tech", "apple"],
            "slug": "apple-ships-five-new-phones",
            "seo_title": "Apple Ships Five New Phones",
            "meta_description": "Apple shipped five new phones this year.",
            "keywords": ["apple", "phones"],
            "image_prompt_main": "16:9 shot",
            "image_prompt_alt1": "alt one",
            "image_prompt_alt2": "alt two",
            "alt_text": "Phones on a table",
            "our_take": "Big quarter ahead.",
            "cta": "Subscribe."
        }"#;
        let article = parse_llm_reply("fallback title", raw, &sample_sources()).unwrap();
        assert_eq!(article.slug, "apple-ships-five-new-phones");
        assert_eq!(article.word_count, 3); // "Launch Body text here. Sources" minus tags
        assert_eq!(article.sources.len(), 1);
    }

    #[test]
    fn test_parse_llm_reply_fills_missing_fields() {
        let raw = r#"{"article_html": "<p>Only a body.</p>"}"#;
        let article = parse_llm_reply("Topic Title Here", raw, &[]).unwrap();
        assert_eq!(article.title, "Topic Title Here");
        assert_eq!(article.slug, "topic-title-here");
        assert_eq!(article.cta, "Subscribe for daily updates.");
    }

    #[test]
    fn test_parse_llm_reply_truncated_is_eof() {
        let raw = r#"{"title": "cut off"#;
        let err = parse_llm_reply("t", raw, &[]).unwrap_err();
        assert!(looks_truncated(&err));
    }

    #[test]
    fn test_build_llm_prompt_mentions_constraints() {
        let prompt = build_llm_prompt("Topic", &sample_facts(), &sample_sources());
        assert!(prompt.contains("Topic: Topic"));
        assert!(prompt.contains("Our take:"));
        assert!(prompt.contains("Sources section"));
        assert!(prompt.contains("- Apple released 5 new phones in 2024"));
    }
}
