//! Utility functions for text normalization, slug generation, and file
//! system checks.
//!
//! This module provides helper functions used throughout the pipeline:
//! - Whitespace normalization and HTML tag stripping for excerpt rewriting
//! - Slug generation for draft filenames and URLs
//! - JSON error detection for handling LLM response truncation
//! - File system validation for output directories

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static NON_SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SLUG_SEP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").unwrap());

/// Collapse all runs of whitespace into single spaces and trim the ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_whitespace("  a\n b\t c "), "a b c");
/// ```
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove HTML tags from a string, leaving the text content.
///
/// This is a regex-based strip for feed summaries and article fragments,
/// not a full HTML parser. Entities are left as-is.
pub fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, "").to_string()
}

/// Convert a title to a URL-friendly slug, capped at 50 characters.
///
/// Lowercases the text, removes anything that is not a word character,
/// space, or hyphen, then collapses separators into single hyphens.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Apple Ships 5 New Phones!"), "apple-ships-5-new-phones");
/// ```
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let cleaned = NON_SLUG_RE.replace_all(&lowered, "");
    let slug = SLUG_SEP_RE.replace_all(cleaned.trim(), "-");
    slug.chars().take(50).collect()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}…(+{} bytes)", head, s.len() - head.len())
    }
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// When an LLM response is cut off (e.g., due to token limits), the
/// resulting JSON fails to parse with an EOF error. This helps identify
/// such cases for retry logic.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test
/// by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
