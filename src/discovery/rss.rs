//! RSS 2.0 and Atom feed parsing with a streaming quick-xml reader.
//!
//! Handles just the fields discovery needs: feed title, entry title,
//! link, summary/description, and publication date. RSS carries the link
//! as element text, Atom as an `href` attribute; both are supported.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, instrument};

/// A single feed item in either RSS or Atom flavor.
#[derive(Debug, Default, Clone)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: Option<String>,
}

/// A parsed feed: channel title plus entries in document order.
#[derive(Debug, Default)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<FeedEntry>,
}

/// Fetch and parse a feed URL.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
) -> Result<ParsedFeed, Box<dyn Error>> {
    let xml = client
        .get(url)
        .timeout(Duration::from_secs(10))
        .send()
        .await?
        .text()
        .await?;
    let feed = parse_feed(&xml)?;
    debug!(entries = feed.entries.len(), "Parsed feed");
    Ok(feed)
}

/// Parse RSS 2.0 or Atom XML into a [`ParsedFeed`].
pub fn parse_feed(xml: &str) -> Result<ParsedFeed, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut feed = ParsedFeed::default();
    let mut current: Option<FeedEntry> = None;
    // Name of the element whose text content we are inside of.
    let mut open_element = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = local_name(&e);
                if name == "item" || name == "entry" {
                    current = Some(FeedEntry::default());
                } else if current.is_some() && name == "link" {
                    capture_atom_href(&e, current.as_mut());
                }
                open_element = name;
            }
            Event::Empty(e) => {
                if local_name(&e) == "link" {
                    capture_atom_href(&e, current.as_mut());
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?.to_string();
                record_text(&open_element, &text, &mut feed, current.as_mut());
            }
            Event::CData(t) => {
                let text = String::from_utf8_lossy(&t.into_inner()).to_string();
                record_text(&open_element, &text, &mut feed, current.as_mut());
            }
            Event::End(e) => {
                let name = strip_ns_prefix(e.name().as_ref());
                if name == "item" || name == "entry" {
                    if let Some(entry) = current.take() {
                        feed.entries.push(entry);
                    }
                }
                open_element.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(feed)
}

/// Element name without any namespace prefix.
fn local_name(e: &BytesStart<'_>) -> String {
    strip_ns_prefix(e.name().as_ref())
}

fn strip_ns_prefix(raw: &[u8]) -> String {
    let raw = String::from_utf8_lossy(raw).to_string();
    match raw.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => raw,
    }
}

/// Atom `<link href="..."/>`, preferring rel="alternate" or unmarked links.
fn capture_atom_href(e: &BytesStart<'_>, current: Option<&mut FeedEntry>) {
    let Some(entry) = current else { return };

    let mut href = None;
    let mut rel_ok = true;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"href" => href = Some(String::from_utf8_lossy(&attr.value).to_string()),
            b"rel" => rel_ok = attr.value.as_ref() == b"alternate",
            _ => {}
        }
    }
    if let Some(href) = href {
        if rel_ok || entry.link.is_empty() {
            entry.link = href;
        }
    }
}

/// Route element text to the right feed/entry field.
fn record_text(
    element: &str,
    text: &str,
    feed: &mut ParsedFeed,
    current: Option<&mut FeedEntry>,
) {
    match current {
        Some(entry) => match element {
            "title" => entry.title = text.to_string(),
            "link" => entry.link = text.to_string(),
            "description" | "summary" => entry.summary = text.to_string(),
            "pubDate" | "published" | "updated" => {
                if entry.published.is_none() {
                    entry.published = Some(text.to_string());
                }
            }
            _ => {}
        },
        None => {
            if element == "title" && feed.title.is_none() {
                feed.title = Some(text.to_string());
            }
        }
    }
}
