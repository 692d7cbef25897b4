//! # LocalNewsAgent
//!
//! An automated news pipeline that discovers trending topics, extracts
//! facts from their source pages, composes draft articles (LLM-assisted
//! with a rule-based fallback), runs QA checks, and writes publish-ready
//! JSON drafts plus standalone HTML pages to disk.
//!
//! ## Usage
//!
//! ```sh
//! local_news_agent --top-topics 3 -q "AI news"
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Discovery**: Collect topics from RSS/Atom feeds, probed site feeds,
//!    and DuckDuckGo search results, ranked by recency
//! 2. **Extraction**: Fetch each topic's page and pull out fact-like
//!    sentences, a lead excerpt, and outbound links (paywalled pages are
//!    skipped)
//! 3. **Composition**: Generate full articles with SEO metadata (parallel,
//!    4 at a time), falling back to templates when the LLM is unavailable
//! 4. **QA**: Validate word count, source overlap, content safety, and
//!    structural markers
//! 5. **Output**: Write JSON drafts, HTML pages, and per-article session
//!    logs

use clap::Parser;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod cli;
mod compose;
mod config;
mod discovery;
mod extractor;
mod models;
mod outputs;
mod qa;
mod utils;

use cli::Cli;
use compose::ArticleComposer;
use config::load_config;
use discovery::DiscoveryEngine;
use extractor::ContentExtractor;
use models::{ComposedArticle, ExtractedArticle, SourceRef, Topic};
use outputs::logs::SessionLog;
use outputs::{html, json};
use qa::{qa_report, QaValidator};
use utils::{ensure_writable_dir, slugify, strip_tags};

const PARALLEL_BATCH_SIZE: usize = 4;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("local_news_agent starting up");

    let args = Cli::parse();
    debug!(?args.drafts_dir, ?args.top_topics, ?args.no_llm, "Parsed CLI arguments");

    let mut config = load_config(args.config.as_deref())?;
    if let Some(min_words) = args.min_words {
        config.qa.min_word_count = min_words;
    }

    // Early check: every output dir must be writable before we spend time
    // on network work
    for dir in [&args.drafts_dir, &args.published_dir, &args.logs_dir] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    // ---- Phase A: discovery ----
    let mut engine = DiscoveryEngine::new();
    engine
        .discover_all(&args.rss_file, &args.sites_file, &args.queries)
        .await?;
    let topics = engine.top_topics(args.top_topics);
    info!(count = topics.len(), "Selected top topics");

    if topics.is_empty() {
        warn!("No topics discovered; nothing to do");
        return Ok(());
    }

    // ---- Phase B: extraction ----
    let extractor = ContentExtractor::new(config.extractor.max_facts, config.extractor.excerpt_words);
    let mut units: Vec<(Topic, Option<ExtractedArticle>)> = Vec::new();
    for topic in topics {
        let extracted = match extractor.extract(&topic.source_url).await {
            Ok(Some(extracted)) if extracted.is_paywalled => {
                info!(url = %topic.source_url, "Skipping paywalled source");
                None
            }
            Ok(Some(extracted)) => Some(extracted),
            Ok(None) => {
                info!(url = %topic.source_url, "No usable content extracted");
                None
            }
            Err(e) => {
                warn!(url = %topic.source_url, error = %e, "Extraction failed");
                None
            }
        };
        units.push((topic, extracted));
    }
    let extracted_count = units.iter().filter(|(_, e)| e.is_some()).count();
    info!(
        extracted = extracted_count,
        skipped = units.len() - extracted_count,
        "Extraction completed"
    );

    // ---- Phase C: composition (parallel) ----
    let use_llm = config.llm.enabled && !args.no_llm;
    let composer = Arc::new(ArticleComposer::new(config.llm.clone(), use_llm));
    info!(
        parallel_batch_size = PARALLEL_BATCH_SIZE,
        use_llm, "Starting parallel composition"
    );

    let composed: Vec<(Topic, Option<ExtractedArticle>, ComposedArticle)> =
        stream::iter(units.into_iter().enumerate())
            .map(|(i, (topic, extracted))| {
                let composer = Arc::clone(&composer);
                async move {
                    debug!(index = i, title = %topic.title_hint, "Composing article");
                    let (facts, sources) = composition_inputs(&topic, extracted.as_ref());
                    let article = composer
                        .compose(&topic.title_hint, &facts, &sources, &topic.category)
                        .await;
                    info!(index = i, slug = %article.slug, "Composed article");
                    (topic, extracted, article)
                }
            })
            .buffer_unordered(PARALLEL_BATCH_SIZE)
            .collect()
            .await;

    // ---- Phases D and E: QA and output, per article ----
    let validator = QaValidator::new(config.qa.min_word_count);
    let mut drafted = 0usize;
    let mut qa_passed = 0usize;

    for (topic, extracted, article) in &composed {
        let slug = if article.slug.is_empty() {
            slugify(&topic.title_hint)
        } else {
            article.slug.clone()
        };
        let mut session = SessionLog::new(&slug);
        session.record_discovery(topic);
        match extracted {
            Some(extracted) => session.record_extraction(extracted),
            None => session.record_skipped_source(&topic.source_url, "no usable content"),
        }
        session.record_composition(article, use_llm);

        let source_texts: Vec<String> = extracted
            .iter()
            .map(|e| e.full_text.clone())
            .collect();
        let verdict = validator.validate(
            &strip_tags(&article.article_html),
            &article.article_html,
            &source_texts,
            true,
            true,
        );
        session.record_qa(&verdict);
        if verdict.passed {
            qa_passed += 1;
        } else {
            warn!(
                slug = %slug,
                issues = verdict.issues.len(),
                "QA failed; draft is written but needs review"
            );
        }
        debug!(slug = %slug, report = %qa_report(&verdict), "QA report");

        let json_path = json::save_draft(article, &verdict, &args.drafts_dir).await?;
        let html_path = html::save_html(article, &args.drafts_dir).await?;
        session.record_output(&json_path, &html_path);
        session.save(&args.logs_dir).await?;
        drafted += 1;
    }

    info!(
        drafted,
        qa_passed,
        qa_failed = drafted - qa_passed,
        elapsed_secs = start_time.elapsed().as_secs(),
        "Pipeline complete"
    );
    Ok(())
}

/// Assemble the composer's inputs for a topic: deduped facts (falling back
/// to the topic excerpt when extraction produced nothing) and the source
/// attribution list.
fn composition_inputs(
    topic: &Topic,
    extracted: Option<&ExtractedArticle>,
) -> (Vec<String>, Vec<SourceRef>) {
    let mut facts: Vec<String> = extracted
        .map(|e| e.bullet_facts.clone())
        .unwrap_or_default();
    if facts.is_empty() && !topic.short_excerpt.is_empty() {
        facts.push(topic.short_excerpt.clone());
    }
    let facts = facts.into_iter().unique().collect();

    let mut sources = vec![SourceRef {
        name: topic.source_name.clone(),
        url: topic.source_url.clone(),
    }];
    if let Some(extracted) = extracted {
        sources.extend(extracted.important_links.iter().map(|link| SourceRef {
            name: topic.source_domain().unwrap_or_else(|| "link".to_string()),
            url: link.clone(),
        }));
    }
    let sources = sources
        .into_iter()
        .unique_by(|s| s.url.clone())
        .collect();

    (facts, sources)
}
