//! Per-article session logs.
//!
//! Each article gets a plain-text log at `{slug}.log` that walks through
//! the pipeline phases for that story: the discovered topic, what was
//! extracted from each source, how composition went, and the full QA
//! report. These are meant for a human reviewing a draft, separate from
//! the structured tracing output of the run itself.

use crate::models::{ComposedArticle, ExtractedArticle, QaResult, Topic};
use crate::qa::qa_report;
use chrono::Utc;
use std::error::Error;
use std::fmt::Write as _;
use tokio::fs;
use tracing::{info, instrument};

/// Accumulates the phase-by-phase record for one article.
#[derive(Debug)]
pub struct SessionLog {
    slug: String,
    body: String,
}

impl SessionLog {
    pub fn new(slug: &str) -> Self {
        let mut body = String::new();
        writeln!(body, "=== Session Log: {slug} ===").unwrap();
        writeln!(body, "Started: {}", Utc::now().to_rfc3339()).unwrap();
        Self {
            slug: slug.to_string(),
            body,
        }
    }

    fn section(&mut self, title: &str) {
        writeln!(self.body, "\n--- {title} ---").unwrap();
    }

    pub fn record_discovery(&mut self, topic: &Topic) {
        self.section("Discovery");
        writeln!(self.body, "Topic: {}", topic.title_hint).unwrap();
        writeln!(self.body, "Source: {} ({})", topic.source_name, topic.source_url).unwrap();
        writeln!(self.body, "Category: {}", topic.category).unwrap();
        writeln!(self.body, "Trend score: {:.1}", topic.trend_score).unwrap();
        if !topic.short_excerpt.is_empty() {
            writeln!(self.body, "Excerpt: {}", topic.short_excerpt).unwrap();
        }
    }

    pub fn record_extraction(&mut self, extracted: &ExtractedArticle) {
        self.section("Extraction");
        writeln!(self.body, "Page title: {}", extracted.title).unwrap();
        writeln!(self.body, "URL: {}", extracted.source_url).unwrap();
        writeln!(self.body, "Paywalled: {}", extracted.is_paywalled).unwrap();
        writeln!(self.body, "Facts ({}):", extracted.bullet_facts.len()).unwrap();
        for fact in &extracted.bullet_facts {
            writeln!(self.body, "  - {fact}").unwrap();
        }
        writeln!(self.body, "Links found: {}", extracted.important_links.len()).unwrap();
    }

    pub fn record_skipped_source(&mut self, url: &str, reason: &str) {
        self.section("Extraction");
        writeln!(self.body, "Skipped {url}: {reason}").unwrap();
    }

    pub fn record_composition(&mut self, article: &ComposedArticle, used_llm: bool) {
        self.section("Composition");
        writeln!(self.body, "Title: {}", article.title).unwrap();
        writeln!(self.body, "Composer: {}", if used_llm { "llm" } else { "template" }).unwrap();
        writeln!(self.body, "Word count: {}", article.word_count).unwrap();
        writeln!(self.body, "Tags: {}", article.tags.join(", ")).unwrap();
        writeln!(self.body, "Sources cited: {}", article.sources.len()).unwrap();
    }

    pub fn record_qa(&mut self, result: &QaResult) {
        self.section("QA");
        self.body.push_str(&qa_report(result));
    }

    pub fn record_output(&mut self, json_path: &str, html_path: &str) {
        self.section("Output");
        writeln!(self.body, "Draft JSON: {json_path}").unwrap();
        writeln!(self.body, "HTML page: {html_path}").unwrap();
    }

    /// Write the finished log as `{slug}.log` and return its path.
    #[instrument(level = "info", skip_all, fields(slug = %self.slug))]
    pub async fn save(mut self, logs_dir: &str) -> Result<String, Box<dyn Error>> {
        writeln!(self.body, "\nFinished: {}", Utc::now().to_rfc3339()).unwrap();
        let path = format!("{}/{}.log", logs_dir.trim_end_matches('/'), self.slug);
        fs::write(&path, &self.body).await?;
        info!(path = %path, "Saved session log");
        Ok(path)
    }

    #[cfg(test)]
    fn body(&self) -> &str {
        &self.body
    }
}
