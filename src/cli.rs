//! Command-line interface definitions for LocalNewsAgent.
//!
//! All options can be provided via command-line flags; directory and
//! config options also accept environment variables.

use clap::Parser;

/// Command-line arguments for the LocalNewsAgent pipeline.
///
/// # Examples
///
/// ```sh
/// # Default run: 3 topics, LLM composition with fallback
/// local_news_agent
///
/// # More topics, skip the LLM entirely
/// local_news_agent --top-topics 5 --no-llm
///
/// # Extra SERP queries alongside the configured feeds
/// local_news_agent -q "AI news" -q "tech trends"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to the agent config YAML file
    #[arg(short, long, env = "NEWS_AGENT_CONFIG")]
    pub config: Option<String>,

    /// Output directory for draft JSON and HTML files
    #[arg(long, env = "NEWS_AGENT_DRAFTS_DIR", default_value = "./drafts")]
    pub drafts_dir: String,

    /// Output directory for published articles
    #[arg(long, env = "NEWS_AGENT_PUBLISHED_DIR", default_value = "./published")]
    pub published_dir: String,

    /// Output directory for session logs
    #[arg(long, env = "NEWS_AGENT_LOGS_DIR", default_value = "./logs")]
    pub logs_dir: String,

    /// File listing RSS feed URLs, one per line ('#' comments allowed)
    #[arg(long, default_value = "rss_feeds.txt")]
    pub rss_file: String,

    /// File listing site base URLs to probe for feeds
    #[arg(long, default_value = "sites.txt")]
    pub sites_file: String,

    /// Additional search queries to scrape results for
    #[arg(short, long)]
    pub queries: Vec<String>,

    /// Number of top topics to process
    #[arg(short, long, default_value_t = 3)]
    pub top_topics: usize,

    /// Override the minimum article word count from the config
    #[arg(long)]
    pub min_words: Option<usize>,

    /// Skip the LLM and compose with rule-based templates only
    #[arg(long)]
    pub no_llm: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["local_news_agent"]);
        assert_eq!(cli.drafts_dir, "./drafts");
        assert_eq!(cli.logs_dir, "./logs");
        assert_eq!(cli.top_topics, 3);
        assert!(!cli.no_llm);
        assert!(cli.queries.is_empty());
        assert!(cli.min_words.is_none());
    }

    #[test]
    fn test_cli_queries_and_flags() {
        let cli = Cli::parse_from([
            "local_news_agent",
            "-q",
            "AI news",
            "-q",
            "tech trends",
            "--no-llm",
            "--top-topics",
            "5",
            "--min-words",
            "600",
        ]);
        assert_eq!(cli.queries, vec!["AI news", "tech trends"]);
        assert!(cli.no_llm);
        assert_eq!(cli.top_topics, 5);
        assert_eq!(cli.min_words, Some(600));
    }
}
