// src/scrape/villazzano.rs
// WordPress site running The Events Calendar (TEC). The plugin's REST
// API is the structured path; when it is disabled we walk the paginated
// archive: JSON-LD first, then TEC article cards, then a plain WP post
// list.

use anyhow::Result;
use serde_json::Value;

use crate::core::dates::{self, date_time_from_text, split_datetime};
use crate::core::html;
use crate::core::net;
use crate::event::Event;

use super::jsonld::{self, Defaults};
use super::Scraper;

const NAME: &str = "teatrodivillazzano.it";
const BASE_URL: &str = "https://www.teatrodivillazzano.it";
const ARCHIVE_URL: &str = "https://www.teatrodivillazzano.it/archivio/";
const TEC_API_URL: &str = "https://www.teatrodivillazzano.it/wp-json/tribe/events/v1/events";

const VENUE: &str = "Teatro di Villazzano";
const LOCATION: &str = "Trento";

const MAX_EVENTS: usize = 200;

const DEFAULTS: Defaults = Defaults {
    source_name: NAME,
    base_url: BASE_URL,
    venue: VENUE,
    location: LOCATION,
};

pub struct Villazzano;

impl Scraper for Villazzano {
    fn name(&self) -> &'static str {
        NAME
    }

    fn scrape(&self) -> Result<Vec<Event>> {
        let events = scrape_api();
        if !events.is_empty() {
            return Ok(events);
        }
        scrape_archive()
    }
}

fn scrape_api() -> Vec<Event> {
    let mut events = Vec::new();
    let today = dates::today().to_string();
    let mut page = 1u32;
    loop {
        let page_s = page.to_string();
        let data = match net::get_json(
            TEC_API_URL,
            &[("start_date", &today), ("per_page", "50"), ("page", &page_s)],
        ) {
            Ok(v) => v,
            // API not installed or returning HTML: the archive fallback takes over.
            Err(_) => return Vec::new(),
        };

        let items = data["events"].as_array().cloned().unwrap_or_default();
        for item in &items {
            if let Some(ev) = parse_api_event(item) {
                events.push(ev);
            }
        }

        let has_next = data["next"].as_str().is_some_and(|s| !s.is_empty());
        if items.is_empty() || !has_next {
            break;
        }
        page += 1;
    }
    events
}

fn parse_api_event(item: &Value) -> Option<Event> {
    let title = item["title"].as_str().unwrap_or("").trim().to_string();
    if title.is_empty() {
        return None;
    }
    // "2026-03-15 20:30:00"
    let (date, time) = split_datetime(item["start_date"].as_str().unwrap_or(""))?;

    let venue_data = &item["venue"];
    let venue = venue_data["venue"].as_str().filter(|s| !s.is_empty()).unwrap_or(VENUE);
    let location = venue_data["city"].as_str().filter(|s| !s.is_empty()).unwrap_or(LOCATION);

    let source_url = item["url"].as_str().unwrap_or("").to_string();
    let mut ev = Event::new(
        title,
        date,
        time,
        venue.to_string(),
        location.to_string(),
        source_url,
        NAME,
    );
    ev.description = item["excerpt"]["rendered"]
        .as_str()
        .map(html::strip_tags)
        .filter(|s| !s.is_empty());
    ev.image_url = item["image"]["url"].as_str().filter(|s| !s.is_empty()).map(str::to_string);
    Some(ev)
}

fn scrape_archive() -> Result<Vec<Event>> {
    let mut events: Vec<Event> = Vec::new();
    let mut url = ARCHIVE_URL.to_string();
    loop {
        let resp = match net::get(&url, &[]) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("[{NAME}] could not fetch {url}: {e:#}");
                break;
            }
        };

        let structured = jsonld::events_from_html(&resp.body, &DEFAULTS);
        if !structured.is_empty() {
            // Structured data lists the whole archive; no card parsing needed.
            for ev in structured {
                if !events.iter().any(|e| e.source_urls == ev.source_urls) {
                    events.push(ev);
                }
            }
            break;
        }

        events.extend(events_from_articles(&resp.body, &events));

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

/// One event per `<article>` card, skipping URLs already collected.
/// Covers both TEC cards and plain WP post lists.
fn events_from_articles(page: &str, already: &[Event]) -> Vec<Event> {
    let mut events = Vec::new();
    let mut at = 0;
    while let Some((start, end)) = html::next_tag_block_ci(page, "<article", "</article>", at) {
        at = end;
        let Some(ev) = parse_article(&page[start..end]) else { continue };
        let dup = already
            .iter()
            .chain(events.iter())
            .any(|e| e.source_urls == ev.source_urls);
        if !dup {
            events.push(ev);
        }
    }
    events
}

fn parse_article(block: &str) -> Option<Event> {
    // Title = text of the first heading link.
    let (hs, he) = html::next_tag_block_ci(block, "<h2", "</h2>", 0)
        .or_else(|| html::next_tag_block_ci(block, "<h3", "</h3>", 0))?;
    let heading = &block[hs..he];
    let (ls, le) = html::next_tag_block_ci(heading, "<a", "</a>", 0)?;
    let link = &heading[ls..le];
    let title = html::strip_tags(link);
    if title.is_empty() {
        return None;
    }
    let href = html::attr(link, "href").unwrap_or_default();
    let source_url = if href.starts_with("http") {
        href
    } else if href.starts_with('/') {
        format!("{BASE_URL}{href}")
    } else {
        String::new()
    };

    let (date, time) = article_date(block)?;

    let mut ev = Event::new(title, date, time, VENUE.into(), LOCATION.into(), source_url, NAME);
    ev.image_url = html::first_img_src(block);
    Some(ev)
}

/// TEC cards carry the start in `<time datetime=…>` or `<abbr title=…>`;
/// older themes only have it in the card text.
fn article_date(block: &str) -> Option<(String, Option<String>)> {
    if let Some((ts, te)) = html::next_tag_block_ci(block, "<time", "</time>", 0) {
        if let Some(parsed) = html::attr(&block[ts..te], "datetime").and_then(|v| split_datetime(&v)) {
            return Some(parsed);
        }
    }
    if let Some((ts, te)) = html::next_tag_block_ci(block, "<abbr", "</abbr>", 0) {
        if let Some(parsed) = html::attr(&block[ts..te], "title").and_then(|v| split_datetime(&v)) {
            return Some(parsed);
        }
    }
    date_time_from_text(&html::strip_tags(block))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tec_api_event() {
        let item: Value = serde_json::from_str(
            r#"{
                "title": "La Tempesta",
                "start_date": "2026-03-15 20:30:00",
                "venue": {"venue": "Sala Polivalente", "city": "Villazzano"},
                "url": "https://www.teatrodivillazzano.it/evento/la-tempesta/",
                "excerpt": {"rendered": "<p>Da Shakespeare</p>"},
                "image": {"url": "https://www.teatrodivillazzano.it/t.jpg"}
            }"#,
        )
        .unwrap();
        let ev = parse_api_event(&item).unwrap();
        assert_eq!(ev.date, "2026-03-15");
        assert_eq!(ev.time.as_deref(), Some("20:30"));
        assert_eq!(ev.venue, "Sala Polivalente");
        assert_eq!(ev.location, "Villazzano");
        assert_eq!(ev.description.as_deref(), Some("Da Shakespeare"));
    }

    #[test]
    fn tec_card_fallback_reads_the_datetime_attr() {
        let block = r#"<article class="type-tribe_events">
            <h3 class="tribe-events-list-event-title"><a href="/evento/la-tempesta/">La Tempesta</a></h3>
            <time datetime="2026-03-15T20:30:00">15 marzo</time>
            <img src="https://www.teatrodivillazzano.it/t.jpg">
        </article>"#;
        let ev = parse_article(block).unwrap();
        assert_eq!(ev.title, "La Tempesta");
        assert_eq!(ev.date, "2026-03-15");
        assert_eq!(ev.time.as_deref(), Some("20:30"));
        assert_eq!(ev.venue, VENUE);
        assert_eq!(
            ev.source_urls,
            vec!["https://www.teatrodivillazzano.it/evento/la-tempesta/"]
        );
        assert_eq!(ev.image_url.as_deref(), Some("https://www.teatrodivillazzano.it/t.jpg"));
    }

    #[test]
    fn wp_post_fallback_reads_dates_from_card_text() {
        let block = r#"<article class="post">
            <h2 class="entry-title"><a href="https://www.teatrodivillazzano.it/recital/">Recital</a></h2>
            <div class="entry-content">Sabato 4 aprile 2026, ore 21.00</div>
        </article>"#;
        let ev = parse_article(block).unwrap();
        assert_eq!(ev.date, "2026-04-04");
        assert_eq!(ev.time.as_deref(), Some("21:00"));
        assert_eq!(ev.location, LOCATION);
    }

    #[test]
    fn cards_without_dates_or_repeats_are_dropped() {
        let undated = r#"<article><h2><a href="/x/">Senza data</a></h2><p>testo</p></article>"#;
        assert!(parse_article(undated).is_none());

        let page = r#"
            <article><h2><a href="/evento/a/">Uno</a></h2><time datetime="2026-05-01"></time></article>
            <article><h2><a href="/evento/a/">Uno</a></h2><time datetime="2026-05-01"></time></article>
        "#;
        let events = events_from_articles(page, &[]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].source_urls, vec!["https://www.teatrodivillazzano.it/evento/a/"]);
    }

    #[test]
    fn missing_venue_falls_back_to_site_defaults() {
        let item: Value = serde_json::from_str(
            r#"{"title": "Recital", "start_date": "2026-04-01 00:00:00"}"#,
        )
        .unwrap();
        let ev = parse_api_event(&item).unwrap();
        assert_eq!(ev.venue, VENUE);
        assert_eq!(ev.location, LOCATION);
        assert_eq!(ev.time, None);
    }
}
