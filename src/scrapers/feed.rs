//! Structured feed adapter (RSS 2.0, RSS 1.0/RDF, Atom).
//!
//! The three formats are read through one serde model: the document root may
//! hold a `<channel>` with `<item>`s (RSS 2.0), `<item>`s directly (RSS 1.0), or
//! `<entry>`s (Atom). Unknown elements are ignored.
//!
//! Elements are matched by local name, so `<media:title>` lands in the same
//! field as `<title>` and `<dc:date>` in `date`. Every text field is therefore a
//! list and the first non-empty value wins.

use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use regex::{Captures, Regex};
use scraper::Html;
use serde::Deserialize;

use super::{Extract, ExtractError};
use crate::models::RawCandidate;
use crate::timeparse::feed_time;

/// A named reference such as `&eacute;`. Numeric references are valid XML already.
static NAMED_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]*);").expect("entity pattern"));

const XML_ENTITIES: &[&str] = &["amp", "lt", "gt", "quot", "apos"];

#[derive(Debug, Default, Deserialize)]
struct FeedDocument {
    #[serde(default)]
    channel: Option<Channel>,
    #[serde(default, rename = "item")]
    items: Vec<FeedEntry>,
    #[serde(default, rename = "entry")]
    entries: Vec<FeedEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct Channel {
    #[serde(default, rename = "item")]
    items: Vec<FeedEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedEntry {
    #[serde(default, rename = "title")]
    titles: Vec<Text>,
    #[serde(default, rename = "link")]
    links: Vec<Link>,
    #[serde(default, rename = "guid")]
    guids: Vec<Text>,
    #[serde(default, rename = "pubDate")]
    pub_dates: Vec<Text>,
    #[serde(default, rename = "published")]
    published: Vec<Text>,
    #[serde(default, rename = "date")]
    dates: Vec<Text>,
    #[serde(default, rename = "updated")]
    updated: Vec<Text>,
}

#[derive(Debug, Default, Deserialize)]
struct Text {
    #[serde(default, rename = "$text")]
    value: Option<String>,
}

/// `<link>url</link>` in RSS, `<link rel=".." href=".."/>` in Atom.
#[derive(Debug, Default, Deserialize)]
struct Link {
    #[serde(default, rename = "@href")]
    href: Option<String>,
    #[serde(default, rename = "@rel")]
    rel: Option<String>,
    #[serde(default, rename = "$text")]
    value: Option<String>,
}

impl FeedDocument {
    fn into_entries(self) -> impl Iterator<Item = FeedEntry> {
        self.channel
            .map(|c| c.items)
            .unwrap_or_default()
            .into_iter()
            .chain(self.items)
            .chain(self.entries)
    }
}

fn non_empty(s: Option<&String>) -> Option<&str> {
    s.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn first_text(texts: &[Text]) -> Option<&str> {
    texts.iter().find_map(|t| non_empty(t.value.as_ref()))
}

impl FeedEntry {
    fn title(&self) -> &str {
        first_text(&self.titles).unwrap_or_default()
    }

    /// Alternate link first, then any link text, then a URL-shaped guid.
    fn link(&self) -> &str {
        let alternate = self.links.iter().find_map(|l| {
            let is_alternate = l.rel.as_deref().is_none_or(|r| r == "alternate");
            if is_alternate { non_empty(l.href.as_ref()) } else { None }
        });
        let text = || self.links.iter().find_map(|l| non_empty(l.value.as_ref()));
        let any_href = || self.links.iter().find_map(|l| non_empty(l.href.as_ref()));
        let guid = || {
            first_text(&self.guids).filter(|g| g.starts_with("http://") || g.starts_with("https://"))
        };
        alternate
            .or_else(text)
            .or_else(any_href)
            .or_else(guid)
            .unwrap_or_default()
    }

    fn published(&self) -> Option<&str> {
        first_text(&self.pub_dates)
            .or_else(|| first_text(&self.published))
            .or_else(|| first_text(&self.dates))
    }

    fn updated(&self) -> Option<&str> {
        first_text(&self.updated)
    }
}

/// Decode one HTML named reference; unknown names decode to nothing.
fn decode_html_entity(name: &str) -> String {
    let reference = format!("&{name};");
    let decoded: String = Html::parse_fragment(&reference)
        .root_element()
        .text()
        .collect();
    if decoded == reference {
        return String::new();
    }
    decoded
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

/// Replace HTML entities that are not defined in XML and would abort parsing.
fn scrub_html_entities_for_xml(s: &str) -> String {
    NAMED_ENTITY
        .replace_all(s, |caps: &Captures| {
            let name = &caps[1];
            if XML_ENTITIES.contains(&name) {
                caps[0].to_string()
            } else {
                decode_html_entity(name)
            }
        })
        .into_owned()
}

pub struct FeedAdapter {
    label: String,
    limit: usize,
}

impl FeedAdapter {
    pub fn new(label: &str, limit: usize) -> Self {
        Self {
            label: label.to_string(),
            limit,
        }
    }
}

impl Extract for FeedAdapter {
    fn extract(&self, payload: &str) -> Result<Vec<RawCandidate>, ExtractError> {
        let doc: FeedDocument = from_str(&scrub_html_entities_for_xml(payload))?;
        Ok(doc
            .into_entries()
            .take(self.limit)
            .map(|e| {
                RawCandidate::new(
                    e.title(),
                    self.label.as_str(),
                    e.link(),
                    feed_time(e.published(), e.updated()),
                )
            })
            .collect())
    }
}
