//! Pattern-based scraping of institutional listing pages.
//!
//! These pages have no feed and no stable DOM, so extraction is heuristic and
//! driven entirely by [`ScrapeRules`]:
//!
//! 1. Bound the search region: from the first occurrence of `anchor`
//!    (case-insensitive) if present, otherwise from the start; at most
//!    `region_cap` bytes either way.
//! 2. Collect hrefs with `link_pattern` (first capture group), resolve them
//!    against `base_url`, deduplicate, keep the first `max_links`.
//! 3. For each link, look at a window around its first occurrence for a title
//!    (per [`TitleRule`]) and a `D Mon YYYY` date.
//!
//! A missing title becomes `fallback_title`; a missing date becomes unknown.

use itertools::Itertools;
use regex::Regex;
use scraper::Html;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{Extract, ExtractError};
use crate::models::RawCandidate;
use crate::timeparse::find_textual_date;
use crate::utils::{bounded_slice, window_around};

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeRules {
    /// Text that marks the start of the interesting part of the page.
    #[serde(default)]
    pub anchor: Option<String>,
    /// Regex whose first capture group is an href.
    pub link_pattern: String,
    /// Relative hrefs are joined onto this.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub title: TitleRule,
    pub fallback_title: String,
    #[serde(default = "default_max_links")]
    pub max_links: usize,
    #[serde(default = "default_region_cap")]
    pub region_cap: usize,
    #[serde(default = "default_window")]
    pub window_before: usize,
    #[serde(default = "default_window")]
    pub window_after: usize,
}

/// Where a scraped item's title comes from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum TitleRule {
    /// First match of `pattern` in the window around the link.
    Pattern { pattern: String },
    /// Last path segment of the link, hyphens as spaces.
    Slug {
        #[serde(default = "default_slug_chars")]
        max_chars: usize,
    },
    /// Always the fallback title.
    #[default]
    Fallback,
}

fn default_max_links() -> usize {
    20
}

fn default_region_cap() -> usize {
    120_000
}

fn default_window() -> usize {
    500
}

fn default_slug_chars() -> usize {
    120
}

enum CompiledTitle {
    Pattern(Regex),
    Slug(usize),
    Fallback,
}

pub struct HtmlAdapter {
    label: String,
    anchor: Option<String>,
    link_re: Regex,
    base: Option<Url>,
    title: CompiledTitle,
    fallback_title: String,
    max_links: usize,
    region_cap: usize,
    window_before: usize,
    window_after: usize,
}

impl HtmlAdapter {
    pub fn new(label: &str, rules: &ScrapeRules) -> Result<Self, ExtractError> {
        let title = match &rules.title {
            TitleRule::Pattern { pattern } => CompiledTitle::Pattern(Regex::new(pattern)?),
            TitleRule::Slug { max_chars } => CompiledTitle::Slug(*max_chars),
            TitleRule::Fallback => CompiledTitle::Fallback,
        };
        Ok(Self {
            label: label.to_string(),
            anchor: rules
                .anchor
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_ascii_lowercase),
            link_re: Regex::new(&rules.link_pattern)?,
            base: rules.base_url.as_deref().map(Url::parse).transpose()?,
            title,
            fallback_title: rules.fallback_title.clone(),
            max_links: rules.max_links,
            region_cap: rules.region_cap,
            window_before: rules.window_before,
            window_after: rules.window_after,
        })
    }

    fn region<'a>(&self, html: &'a str) -> &'a str {
        // ASCII lowercasing keeps byte offsets aligned with `html`.
        let start = self
            .anchor
            .as_ref()
            .and_then(|a| html.to_ascii_lowercase().find(a.as_str()))
            .unwrap_or(0);
        bounded_slice(html, start, self.region_cap)
    }

    fn resolve(&self, href: &str) -> String {
        match &self.base {
            Some(base) => base
                .join(href)
                .map(String::from)
                .unwrap_or_else(|_| href.to_string()),
            None => href.to_string(),
        }
    }

    fn title_for(&self, window: &str, link: &str) -> String {
        let found = match &self.title {
            CompiledTitle::Pattern(re) => re.find(window).map(|m| fragment_text(m.as_str())),
            CompiledTitle::Slug(max_chars) => Some(slug_title(link, *max_chars)),
            CompiledTitle::Fallback => None,
        };
        found
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.fallback_title.clone())
    }
}

impl Extract for HtmlAdapter {
    fn extract(&self, payload: &str) -> Result<Vec<RawCandidate>, ExtractError> {
        let region = self.region(payload);

        let links: Vec<(&str, String)> = self
            .link_re
            .captures_iter(region)
            .filter_map(|caps| caps.get(1))
            .map(|m| (m.as_str(), self.resolve(m.as_str())))
            .unique_by(|(_, link)| link.clone())
            .take(self.max_links)
            .collect();
        debug!(source = %self.label, links = links.len(), "Scraped links");

        Ok(links
            .into_iter()
            .map(|(href, link)| {
                let idx = region.find(href).unwrap_or(0);
                let window = window_around(region, idx, self.window_before, self.window_after);
                let title = self.title_for(window, &link);
                RawCandidate::new(title, self.label.as_str(), link, find_textual_date(window))
            })
            .collect())
    }
}

/// Visible text of an HTML fragment: entities decoded, tags dropped.
fn fragment_text(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect::<String>()
}

/// `https://x/y/gdp-growth-q3-2025.html` -> `gdp growth q3 2025`.
fn slug_title(link: &str, max_chars: usize) -> String {
    let path = link.split(['?', '#']).next().unwrap_or_default();
    let slug = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let slug = slug
        .strip_suffix(".html")
        .or_else(|| slug.strip_suffix(".htm"))
        .unwrap_or(slug);
    slug.replace('-', " ").trim().chars().take(max_chars).collect()
}
