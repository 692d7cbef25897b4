//! JSON draft records for downstream publishing.
//!
//! Each draft bundles the composed article with its QA verdict so the
//! publish step (an external collaborator) can decide what to do with a
//! failing draft. Draft filenames carry a timestamp so multiple runs for
//! the same slug never collide.

use crate::models::{ComposedArticle, QaResult};
use chrono::Local;
use serde::Serialize;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// A draft record as persisted to disk: the article plus its QA verdict.
#[derive(Debug, Serialize)]
pub struct DraftRecord<'a> {
    #[serde(flatten)]
    pub article: &'a ComposedArticle,
    pub qa: &'a QaResult,
}

/// Write a publish-ready JSON draft as `{slug}__{timestamp}.json`.
///
/// Returns the path of the written file.
#[instrument(level = "info", skip_all, fields(slug = %article.slug))]
pub async fn save_draft(
    article: &ComposedArticle,
    qa: &QaResult,
    drafts_dir: &str,
) -> Result<String, Box<dyn Error>> {
    let record = DraftRecord { article, qa };
    let json = serde_json::to_string_pretty(&record)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = format!(
        "{}/{}__{}.json",
        drafts_dir.trim_end_matches('/'),
        article.slug,
        timestamp
    );

    fs::write(&path, json).await?;
    info!(path = %path, "Saved draft");
    Ok(path)
}

/// Copy an article into the published directory with a `_published`
/// suffix. This is the local file move; the actual upload is out of scope.
#[instrument(level = "info", skip_all, fields(slug = %article.slug))]
pub async fn publish_article(
    article: &ComposedArticle,
    published_dir: &str,
) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(article)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = format!(
        "{}/{}__{}_published.json",
        published_dir.trim_end_matches('/'),
        article.slug,
        timestamp
    );

    fs::write(&path, json).await?;
    info!(path = %path, "Published article");
    Ok(path)
}

/// List draft JSON files, newest first (timestamped names sort that way).
pub async fn list_drafts(drafts_dir: &str) -> Result<Vec<String>, Box<dyn Error>> {
    list_matching(drafts_dir, |name| {
        name.contains("__") && name.ends_with(".json") && !name.ends_with("_published.json")
    })
    .await
}

/// List published JSON files, newest first.
pub async fn list_published(published_dir: &str) -> Result<Vec<String>, Box<dyn Error>> {
    list_matching(published_dir, |name| name.ends_with("_published.json")).await
}

async fn list_matching(
    dir: &str,
    keep: impl Fn(&str) -> bool,
) -> Result<Vec<String>, Box<dyn Error>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if keep(&name) {
            paths.push(entry.path().to_string_lossy().to_string());
        }
    }
    paths.sort_by(|a, b| b.cmp(a));
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceRef;

    fn sample_article() -> ComposedArticle {
        ComposedArticle {
            title: "Test Article".to_string(),
            article_html: "<p>Body</p>".to_string(),
            summary: "Summary".to_string(),
            word_count: 1,
            tags: vec!["tech".to_string()],
            slug: "test-article".to_string(),
            seo_title: "Test Article".to_string(),
            meta_description: "Desc".to_string(),
            keywords: vec![],
            image_prompt_main: String::new(),
            image_prompt_alt1: String::new(),
            image_prompt_alt2: String::new(),
            alt_text: String::new(),
            sources: vec![SourceRef {
                name: "Example".to_string(),
                url: "https://example.com".to_string(),
            }],
            cta: "Subscribe.".to_string(),
            our_take: "Notable.".to_string(),
            published_at: "2025-05-06T20:30:00Z".to_string(),
        }
    }

    fn sample_qa() -> QaResult {
        QaResult {
            passed: true,
            issues: vec![],
            word_count: 1,
            is_adsense_safe: true,
        }
    }

    #[test]
    fn test_draft_record_embeds_qa_verdict() {
        let article = sample_article();
        let qa = sample_qa();
        let record = DraftRecord {
            article: &article,
            qa: &qa,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"slug\":\"test-article\""));
        assert!(json.contains("\"qa\":{"));
        assert!(json.contains("\"passed\":true"));
    }

    #[tokio::test]
    async fn test_save_draft_and_list() {
        let dir = std::env::temp_dir().join("lna_json_test");
        let _ = tokio::fs::remove_dir_all(&dir).await;
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let dir_str = dir.to_str().unwrap();

        let path = save_draft(&sample_article(), &sample_qa(), dir_str)
            .await
            .unwrap();
        assert!(path.contains("test-article__"));
        assert!(tokio::fs::try_exists(&path).await.unwrap());

        let drafts = list_drafts(dir_str).await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert!(list_published(dir_str).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_article_suffix() {
        let dir = std::env::temp_dir().join("lna_publish_test");
        let _ = tokio::fs::remove_dir_all(&dir).await;
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let dir_str = dir.to_str().unwrap();

        let path = publish_article(&sample_article(), dir_str).await.unwrap();
        assert!(path.ends_with("_published.json"));

        let published = list_published(dir_str).await.unwrap();
        assert_eq!(published.len(), 1);
        assert!(list_drafts(dir_str).await.unwrap().is_empty());
    }
}
