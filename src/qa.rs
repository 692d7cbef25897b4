//! QA validation for composed articles: word count, source overlap,
//! ad-safety term scanning, and structural marker checks.
//!
//! All four checks run unconditionally on every call; a failing check
//! records its issues and clears `passed` without stopping the others, so
//! a caller always sees the complete picture in one pass. A failing
//! [`QaResult`] is a normal content-quality outcome, not an error.
//!
//! The overlap check is a crude textual-similarity proxy, not semantic
//! plagiarism detection. Its constants (4-word windows, 15-character
//! minimum, failure at 5 matches) are load-bearing for behavioral parity
//! and must not be retuned casually.

use crate::models::QaResult;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

/// Number of consecutive words per overlap window.
const OVERLAP_WINDOW_WORDS: usize = 4;
/// Windows whose joined text is shorter than this are ignored.
const OVERLAP_MIN_CHARS: usize = 15;
/// The overlap check fails at this many matching windows.
const OVERLAP_FAIL_THRESHOLD: usize = 5;

/// Marker phrase for the editorial-opinion section (case-sensitive).
const TAKE_MARKER: &str = "Our take";
/// Marker for the sources section in the article HTML.
const SOURCES_MARKER: &str = "Sources";

static SPAM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:bitc0in|viagra|casino)\b").unwrap());

/// Quality assurance validator for composed articles.
///
/// The banned-term vocabulary and minimum word count are instance-owned
/// configuration fixed at construction; validators with different
/// thresholds can coexist and nothing is mutated across calls.
pub struct QaValidator {
    min_word_count: usize,
    disallowed_terms: Vec<&'static str>,
}

impl QaValidator {
    /// Create a validator with the default banned-term vocabulary.
    pub fn new(min_word_count: usize) -> Self {
        Self {
            min_word_count,
            disallowed_terms: vec![
                // adult / explicit
                "adult",
                "explicit",
                "porn",
                "xxx",
                // violence / self-harm
                "hate",
                "kill",
                "murder",
                "suicide",
                // unlicensed medical claims
                "medical advice",
                "guaranteed cure",
                "treat disease",
                // unlicensed financial claims
                "financial advice",
                "guaranteed return",
                "easy money",
            ],
        }
    }

    /// Run the full QA check on an article.
    ///
    /// `article_text` is the plain-text body, `article_html` the HTML
    /// fragment (only scanned for the sources marker, never parsed), and
    /// `source_texts` the plain-text documents the article was derived
    /// from. Issues are reported in check order: word count, overlap,
    /// safety, structural.
    #[instrument(level = "info", skip_all)]
    pub fn validate(
        &self,
        article_text: &str,
        article_html: &str,
        source_texts: &[String],
        requires_take_statement: bool,
        requires_sources_section: bool,
    ) -> QaResult {
        let mut issues: Vec<String> = Vec::new();
        let mut passed = true;

        // 1. Word count
        let word_count = article_text.split_whitespace().count();
        if word_count < self.min_word_count {
            issues.push(format!(
                "Word count {} < {}",
                word_count, self.min_word_count
            ));
            passed = false;
        }

        // 2. Overlap with sources
        let matches = overlap_matches(article_text, source_texts);
        let match_count = matches.len();
        issues.extend(matches);
        if match_count >= OVERLAP_FAIL_THRESHOLD {
            passed = false;
        }

        // 3. Ad-safety term scan
        let violations = self.safety_violations(article_text);
        let is_adsense_safe = violations.is_empty();
        if !is_adsense_safe {
            issues.extend(violations);
            passed = false;
        }

        // 4. Structural markers
        if requires_take_statement && !article_text.contains(TAKE_MARKER) {
            issues.push("Missing 'Our take' statement".to_string());
            passed = false;
        }
        if requires_sources_section && !article_html.contains(SOURCES_MARKER) {
            issues.push("Missing Sources section".to_string());
            passed = false;
        }

        if passed {
            info!(word_count, "QA passed");
        } else {
            warn!(
                word_count,
                issue_count = issues.len(),
                "QA failed"
            );
        }

        QaResult {
            passed,
            issues,
            word_count,
            is_adsense_safe,
        }
    }

    /// Scan for banned terms and spam indicators (case-insensitive).
    fn safety_violations(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let mut violations: Vec<String> = self
            .disallowed_terms
            .iter()
            .filter(|term| lower.contains(*term))
            .map(|term| format!("Disallowed term found: '{}'", term))
            .collect();

        if SPAM_RE.is_match(&lower) {
            violations.push("Spam-like terms detected".to_string());
        }

        violations
    }
}

/// Collect one "potential match" issue for every source window also
/// present in the article's window set.
///
/// Windows are case-folded for comparison; the issue text keeps the
/// source's original casing, truncated to 40 characters.
fn overlap_matches(article_text: &str, source_texts: &[String]) -> Vec<String> {
    let article_windows: HashSet<String> = windows_of(article_text)
        .map(|phrase| phrase.to_lowercase())
        .collect();

    let mut matches = Vec::new();
    for source in source_texts {
        for phrase in windows_of(source) {
            if article_windows.contains(&phrase.to_lowercase()) {
                let preview: String = phrase.chars().take(40).collect();
                matches.push(format!("Potential match: {}", preview));
            }
        }
    }
    matches
}

/// All 4-word sliding windows of a text whose joined form is at least 15
/// characters long.
fn windows_of(text: &str) -> impl Iterator<Item = String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut result = Vec::new();
    if words.len() >= OVERLAP_WINDOW_WORDS {
        for w in words.windows(OVERLAP_WINDOW_WORDS) {
            let phrase = w.join(" ");
            if phrase.chars().count() >= OVERLAP_MIN_CHARS {
                result.push(phrase);
            }
        }
    }
    result.into_iter()
}

/// Render a [`QaResult`] as a multi-line human-readable report.
///
/// Pure formatting; runs no additional validation.
pub fn qa_report(result: &QaResult) -> String {
    let mut report = format!("Word Count: {}\n", result.word_count);
    report.push_str(&format!(
        "AdSense Safe: {}\n",
        if result.is_adsense_safe { "✓" } else { "✗" }
    ));
    report.push_str(&format!(
        "QA Status: {}\n",
        if result.passed { "PASSED" } else { "FAILED" }
    ));

    if !result.issues.is_empty() {
        report.push_str(&format!("\nIssues ({}):\n", result.issues.len()));
        for issue in &result.issues {
            report.push_str(&format!("  - {}\n", issue));
        }
    }

    report
}
