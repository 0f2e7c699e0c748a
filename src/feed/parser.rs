use crate::util::{html_to_text, strip_control_chars};
use chrono::{DateTime, Utc};
use feed_rs::model;
use feed_rs::parser;
use thiserror::Error;

/// One item of a feed, reduced to what the entry list shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub title: String,
    pub link: String,
    /// Plain-text summary; empty when the feed carries neither summary nor content.
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not RSS, Atom or JSON Feed
    #[error("Malformed feed: {0}")]
    Malformed(#[from] parser::ParseFeedError),
    /// An entry lacks a field every entry must have
    #[error("Entry {index} has no {field}")]
    MissingField { index: usize, field: &'static str },
}

/// Parse a raw feed document into its entries, in document order.
///
/// Rejects the whole document if any entry has no title or no link rather
/// than returning the entries that happened to be complete. A feed with no
/// entries parses to an empty list.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<Entry>, ParseError> {
    let feed = parser::parse(bytes)?;

    feed.entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| convert_entry(index, entry))
        .collect()
}

fn convert_entry(index: usize, entry: model::Entry) -> Result<Entry, ParseError> {
    let title = entry
        .title
        .map(|t| text_line(&t))
        .filter(|t| !t.is_empty())
        .ok_or(ParseError::MissingField {
            index,
            field: "title",
        })?;

    let link = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref() == Some("alternate"))
        .or_else(|| entry.links.first())
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
        .ok_or(ParseError::MissingField {
            index,
            field: "link",
        })?;

    let summary = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .map(|s| clean_line(&s))
        .unwrap_or_default();

    Ok(Entry {
        title,
        link,
        summary,
        published: entry.published.or(entry.updated),
    })
}

/// Flatten a feed text construct to one line, treating it as markup only
/// when the feed declares it as HTML.
fn text_line(text: &model::Text) -> String {
    if text.content_type.essence().to_string() == "text/html" {
        clean_line(&text.content)
    } else {
        strip_control_chars(&text.content)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Summaries and content bodies are HTML in practice whatever their declared type.
fn clean_line(raw: &str) -> String {
    html_to_text(&strip_control_chars(raw))
}
