// src/scrape/trentino_spettacoli.rs
// WordPress portal. Primary path is the core WP REST API (custom post
// type "eventi", then plain posts) with ACF fields carrying the event
// date; fallback scrapes the teatro tag archive: JSON-LD first, then
// Italian date phrases in the article text.

use anyhow::Result;
use serde_json::Value;

use crate::core::dates::{self, date_time_from_text, extract_time, split_datetime};
use crate::core::html;
use crate::core::net;
use crate::event::Event;

use super::jsonld::{self, Defaults};
use super::Scraper;

const NAME: &str = "trentinospettacoli.it";
const BASE_URL: &str = "https://www.trentinospettacoli.it";
const TAG_URL: &str = "https://www.trentinospettacoli.it/tag_eventi/teatro/";
const WP_API_EVENTI: &str = "https://www.trentinospettacoli.it/wp-json/wp/v2/eventi";
const WP_API_POSTS: &str = "https://www.trentinospettacoli.it/wp-json/wp/v2/posts";

const MAX_EVENTS: usize = 300;

const DEFAULTS: Defaults = Defaults {
    source_name: NAME,
    base_url: BASE_URL,
    venue: "",
    location: "",
};

pub struct TrentinoSpettacoli;

impl Scraper for TrentinoSpettacoli {
    fn name(&self) -> &'static str {
        NAME
    }

    fn scrape(&self) -> Result<Vec<Event>> {
        let today = dates::today().to_string();
        for endpoint in [WP_API_EVENTI, WP_API_POSTS] {
            let events = fetch_endpoint(endpoint, &today);
            if !events.is_empty() {
                return Ok(events);
            }
        }
        scrape_tag_archive()
    }
}

fn fetch_endpoint(endpoint: &str, today: &str) -> Vec<Event> {
    let mut events = Vec::new();
    let mut page = 1u32;
    loop {
        let page_s = page.to_string();
        let resp = match net::get(
            endpoint,
            &[
                ("per_page", "100"),
                ("page", &page_s),
                ("after", today),
                ("_fields", "id,title,date,link,excerpt,acf,_embedded"),
                ("_embed", "wp:featuredmedia"),
            ],
        ) {
            Ok(r) => r,
            Err(_) => return Vec::new(),
        };
        let Ok(items) = serde_json::from_str::<Value>(&resp.body) else { return Vec::new() };
        let Some(list) = items.as_array() else { return Vec::new() };
        if list.is_empty() {
            break;
        }

        for item in list {
            if let Some(ev) = parse_api_item(item) {
                events.push(ev);
            }
        }

        let total_pages: u32 = resp
            .header("x-wp-totalpages")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);
        if page >= total_pages {
            break;
        }
        page += 1;
    }
    events
}

fn parse_api_item(item: &Value) -> Option<Event> {
    let raw_title = match &item["title"] {
        Value::Object(_) => item["title"]["rendered"].as_str().unwrap_or(""),
        Value::String(s) => s.as_str(),
        _ => "",
    };
    let title = html::strip_tags(raw_title);
    if title.is_empty() {
        return None;
    }

    let source_url = item["link"].as_str().unwrap_or("").to_string();

    // ACF date fields first, then the post's own date.
    let acf = &item["acf"];
    let date_str = ["data_evento", "start_date", "date"]
        .iter()
        .find_map(|k| acf[*k].as_str().filter(|s| !s.is_empty()))
        .or_else(|| item["date"].as_str())
        .unwrap_or("");
    let (date, mut time) = split_datetime(date_str)?;

    if time.is_none() {
        let time_raw = ["ora_inizio", "time"]
            .iter()
            .find_map(|k| acf[*k].as_str())
            .unwrap_or("");
        time = extract_time(time_raw);
    }

    let venue = ["luogo", "venue", "teatro"]
        .iter()
        .find_map(|k| acf[*k].as_str().filter(|s| !s.is_empty()))
        .unwrap_or("")
        .to_string();
    let location = ["comune", "city", "location"]
        .iter()
        .find_map(|k| acf[*k].as_str().filter(|s| !s.is_empty()))
        .unwrap_or("")
        .to_string();

    let mut ev = Event::new(title, date, time, venue, location, source_url, NAME);
    ev.description = item["excerpt"]["rendered"]
        .as_str()
        .map(html::strip_tags)
        .filter(|s| !s.is_empty());
    ev.image_url = item["_embedded"]["wp:featuredmedia"][0]["source_url"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Some(ev)
}

fn scrape_tag_archive() -> Result<Vec<Event>> {
    let mut events: Vec<Event> = Vec::new();
    let mut url = TAG_URL.to_string();
    loop {
        let resp = match net::get(&url, &[]) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("[{NAME}] could not fetch {url}: {e:#}");
                break;
            }
        };

        let structured = jsonld::events_from_html(&resp.body, &DEFAULTS);
        if structured.is_empty() {
            events.extend(events_from_articles(&resp.body, &events));
        } else {
            for ev in structured {
                if !events.iter().any(|e| e.source_urls == ev.source_urls) {
                    events.push(ev);
                }
            }
        }

        match html::next_link(&resp.body).and_then(resolve_next) {
            Some(next) if events.len() <= MAX_EVENTS => url = next,
            _ => break,
        }
    }
    Ok(events)
}

// WP themes emit both absolute and site-rooted next links.
fn resolve_next(href: String) -> Option<String> {
    if href.starts_with("http") {
        Some(href)
    } else if href.starts_with('/') {
        Some(format!("{BASE_URL}{href}"))
    } else {
        None
    }
}

/// Last-resort extraction: one event per <article> that links a title and
/// carries a recognizable date in its text.
fn events_from_articles(page: &str, already: &[Event]) -> Vec<Event> {
    let mut events = Vec::new();
    let mut at = 0;
    while let Some((start, end)) = html::next_tag_block_ci(page, "<article", "</article>", at) {
        at = end;
        let block = &page[start..end];
        let Some(ev) = parse_article(block) else { continue };
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
    } else if !href.is_empty() {
        format!("{BASE_URL}{href}")
    } else {
        String::new()
    };

    let text = html::strip_tags(block);
    let (date, time) = date_time_from_text(&text).or_else(|| {
        // <time datetime="..."> as a weaker signal (publication date).
        let (ts, te) = html::next_tag_block_ci(block, "<time", "</time>", 0)?;
        split_datetime(&html::attr(&block[ts..te], "datetime")?)
    })?;

    Some(Event::new(title, date, time, String::new(), String::new(), source_url, NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_acf_backed_api_item() {
        let item: Value = serde_json::from_str(
            r#"{
                "title": {"rendered": "Sei personaggi in cerca d&amp;autore"},
                "link": "https://www.trentinospettacoli.it/sei-personaggi/",
                "date": "2026-01-02T09:00:00",
                "acf": {"data_evento": "2026-02-20", "ora_inizio": "21.00",
                        "luogo": "Teatro Zandonai", "comune": "Rovereto"},
                "excerpt": {"rendered": "<p>Pirandello</p>"}
            }"#,
        )
        .unwrap();
        let ev = parse_api_item(&item).unwrap();
        assert_eq!(ev.date, "2026-02-20");
        assert_eq!(ev.time.as_deref(), Some("21:00"));
        assert_eq!(ev.venue, "Teatro Zandonai");
        assert_eq!(ev.location, "Rovereto");
        assert_eq!(ev.description.as_deref(), Some("Pirandello"));
    }

    #[test]
    fn article_fallback_reads_italian_dates() {
        let block = r#"<article class="post">
            <h2 class="entry-title"><a href="/spettacolo/il-servitore/">Il servitore di due padroni</a></h2>
            <div class="entry-content">In scena il 14 marzo 2026 alle ore 20.45 al Teatro Sociale.</div>
        </article>"#;
        let ev = parse_article(block).unwrap();
        assert_eq!(ev.title, "Il servitore di due padroni");
        assert_eq!(ev.date, "2026-03-14");
        assert_eq!(ev.time.as_deref(), Some("20:45"));
        assert_eq!(
            ev.source_urls,
            vec!["https://www.trentinospettacoli.it/spettacolo/il-servitore/"]
        );
    }

    #[test]
    fn next_links_resolve_against_the_site_root() {
        assert_eq!(
            resolve_next("/tag_eventi/teatro/page/2/".into()).as_deref(),
            Some("https://www.trentinospettacoli.it/tag_eventi/teatro/page/2/")
        );
        assert_eq!(
            resolve_next("https://www.trentinospettacoli.it/tag_eventi/teatro/page/3/".into())
                .as_deref(),
            Some("https://www.trentinospettacoli.it/tag_eventi/teatro/page/3/")
        );
        assert_eq!(resolve_next("javascript:void(0)".into()), None);
    }

    #[test]
    fn articles_without_dates_are_dropped() {
        let block = r#"<article><h2><a href="/x/">Senza data</a></h2><p>testo</p></article>"#;
        assert!(parse_article(block).is_none());
    }
}
