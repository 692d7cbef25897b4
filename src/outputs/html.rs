//! Standalone HTML page rendering for drafts.
//!
//! Produces a complete, self-contained page: meta/OG tags from the SEO
//! fields, a summary block, the article body, a Sources list, and the CTA.

use crate::models::ComposedArticle;
use std::error::Error;
use std::fmt::Write as _;
use tokio::fs;
use tracing::{info, instrument};

/// Render a complete HTML page from a composed article.
pub fn render_html_page(article: &ComposedArticle) -> String {
    let keywords = article.keywords.join(", ");
    let tags = article.tags.join(", ");

    let mut image_section = String::new();
    if !article.image_prompt_main.is_empty() {
        write!(
            image_section,
            r#"
    <figure>
        <img src="https://via.placeholder.com/1200x675" alt="{}">
        <figcaption>Image prompt: {}</figcaption>
    </figure>
"#,
            article.alt_text, article.image_prompt_main
        )
        .unwrap();
    }

    let mut sources_section = String::new();
    if !article.sources.is_empty() {
        sources_section.push_str("<h2>Sources</h2>\n<ul>");
        for source in &article.sources {
            write!(
                sources_section,
                "\n  <li><a href=\"{}\">{}</a></li>",
                source.url, source.name
            )
            .unwrap();
        }
        sources_section.push_str("\n</ul>");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <meta name="description" content="{meta_description}">
    <meta name="keywords" content="{keywords}">
    <meta property="og:title" content="{seo_title}">
    <meta property="og:description" content="{meta_description}">
    <meta name="article:tag" content="{tags}">
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            color: #333;
        }}
        h1 {{ font-size: 2.5em; margin-bottom: 0.5em; }}
        h2 {{ font-size: 1.8em; margin-top: 1em; margin-bottom: 0.5em; }}
        p {{ margin-bottom: 1em; }}
        ul, ol {{ margin-left: 2em; margin-bottom: 1em; }}
        a {{ color: #0066cc; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        .meta {{ color: #666; font-size: 0.9em; margin-bottom: 1em; }}
        .cta {{ background: #f0f0f0; padding: 1em; border-radius: 4px; margin: 1.5em 0; }}
        figure {{ margin: 1.5em 0; text-align: center; }}
        figure img {{ max-width: 100%; height: auto; }}
        figcaption {{ font-size: 0.9em; color: #666; margin-top: 0.5em; }}
    </style>
</head>
<body>
    <article>
        <header>
            <h1>{title}</h1>
            <div class="meta">
                <p>Published: {published_at}</p>
                <p>Tags: {tags}</p>
            </div>
        </header>
        {image_section}
        <div class="summary">
            <p><strong>Summary:</strong> {summary}</p>
        </div>

        <main>
            {article_html}
        </main>

        {sources_section}

        <div class="cta">
            <p><strong>{cta}</strong></p>
        </div>
    </article>
</body>
</html>"#,
        title = article.title,
        meta_description = article.meta_description,
        keywords = keywords,
        seo_title = article.seo_title,
        tags = tags,
        published_at = article.published_at,
        image_section = image_section,
        summary = article.summary,
        article_html = article.article_html,
        sources_section = sources_section,
        cta = article.cta,
    )
}

/// Write the article's standalone HTML page as `{slug}.html`.
#[instrument(level = "info", skip_all, fields(slug = %article.slug))]
pub async fn save_html(
    article: &ComposedArticle,
    drafts_dir: &str,
) -> Result<String, Box<dyn Error>> {
    let path = format!("{}/{}.html", drafts_dir.trim_end_matches('/'), article.slug);
    fs::write(&path, render_html_page(article)).await?;
    info!(path = %path, "Saved HTML");
    Ok(path)
}
