// src/scrape/crushsite.rs
// Custom CMS listing of the danza/teatro section. No usable API: JSON-LD
// when present, otherwise generic extraction from article blocks
// (<time datetime> attributes, Italian date phrases), following rel=next
// pagination with a safety cap.

use anyhow::Result;

use crate::core::dates::{date_time_from_text, split_datetime};
use crate::core::html;
use crate::core::net;
use crate::event::Event;

use super::jsonld::{self, Defaults};
use super::Scraper;

const NAME: &str = "crushsite.it";
const BASE_URL: &str = "https://www.crushsite.it";
const LISTING_URL: &str = "https://www.crushsite.it/it/soggetti/danza-teatro/";

const MAX_EVENTS: usize = 300;

const DEFAULTS: Defaults = Defaults {
    source_name: NAME,
    base_url: BASE_URL,
    venue: "",
    location: "",
};

pub struct Crushsite;

impl Scraper for Crushsite {
    fn name(&self) -> &'static str {
        NAME
    }

    fn scrape(&self) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = Vec::new();
        let mut url = LISTING_URL.to_string();
        loop {
            let resp = match net::get(&url, &[]) {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("[{NAME}] could not fetch {url}: {e:#}");
                    break;
                }
            };

            let mut page_events = jsonld::events_from_html(&resp.body, &DEFAULTS);
            if page_events.is_empty() {
                page_events = events_from_articles(&resp.body);
            }
            for ev in page_events {
                if !events.iter().any(|e| e.source_urls == ev.source_urls) {
                    events.push(ev);
                }
            }

            match html::next_link(&resp.body) {
                Some(next) if events.len() <= MAX_EVENTS => {
                    url = if next.starts_with("http") {
                        next
                    } else if next.starts_with('/') {
                        format!("{BASE_URL}{next}")
                    } else {
                        break;
                    };
                }
                _ => break,
            }
        }
        Ok(events)
    }
}

fn events_from_articles(page: &str) -> Vec<Event> {
    let mut events = Vec::new();
    let mut at = 0;
    while let Some((start, end)) = html::next_tag_block_ci(page, "<article", "</article>", at) {
        at = end;
        if let Some(ev) = parse_article(&page[start..end]) {
            events.push(ev);
        }
    }
    events
}

fn parse_article(block: &str) -> Option<Event> {
    let link = first_heading_link(block)?;
    let title = html::strip_tags(&link);
    if title.is_empty() {
        return None;
    }
    let href = html::attr(&link, "href").unwrap_or_default();
    let source_url = if href.starts_with("http") {
        href
    } else if !href.is_empty() {
        format!("{BASE_URL}{href}")
    } else {
        String::new()
    };

    let (date, time) = extract_date_and_time(block)?;
    Some(Event::new(title, date, time, String::new(), String::new(), source_url, NAME))
}

fn first_heading_link(block: &str) -> Option<String> {
    for (open, close) in [("<h2", "</h2>"), ("<h3", "</h3>"), ("<h4", "</h4>")] {
        if let Some((hs, he)) = html::next_tag_block_ci(block, open, close, 0) {
            let heading = &block[hs..he];
            if let Some((ls, le)) = html::next_tag_block_ci(heading, "<a", "</a>", 0) {
                return Some(heading[ls..le].to_string());
            }
            // Heading without a link still names the show.
            return Some(heading.to_string());
        }
    }
    None
}

/// <time datetime> first, then Italian/ISO dates in the visible text.
fn extract_date_and_time(block: &str) -> Option<(String, Option<String>)> {
    if let Some((ts, te)) = html::next_tag_block_ci(block, "<time", "</time>", 0) {
        if let Some(dt) = html::attr(&block[ts..te], "datetime") {
            if let Some(parsed) = split_datetime(&dt).or_else(|| split_datetime(dt.get(..10)?)) {
                return Some(parsed);
            }
        }
    }
    date_time_from_text(&html::strip_tags(block))
}
