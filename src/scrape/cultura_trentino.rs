// src/scrape/cultura_trentino.rs
// JSON calendar API of the provincial culture portal. The API answers
// named ranges ("today"/"week"/"month") and single dd/mm/yyyy dates; we
// probe the named ranges first, then one date per future week.

use std::collections::HashSet;

use anyhow::Result;
use chrono::{Datelike, Duration};
use serde_json::Value;

use crate::core::dates::{self, extract_time};
use crate::core::net;
use crate::event::Event;

use super::Scraper;

const NAME: &str = "cultura.trentino.it";
const BASE_URL: &str = "https://www.cultura.trentino.it/calendar/search/node/(id)/298848";
const TEATRO_CATEGORY: &str = "30734";
const WEEKS_AHEAD: i64 = 9;

pub struct CulturaTrentino;

impl Scraper for CulturaTrentino {
    fn name(&self) -> &'static str {
        NAME
    }

    fn scrape(&self) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        let mut seen_ids: HashSet<i64> = HashSet::new();

        for when in ["today", "week", "month"] {
            fetch_window(when, &mut events, &mut seen_ids);
        }

        // Fill in future weeks with one probe per week.
        let start = dates::today() + Duration::days(7);
        for week in 0..WEEKS_AHEAD {
            let d = start + Duration::weeks(week);
            let when = format!("{:02}/{:02}/{}", d.day(), d.month(), d.year());
            fetch_window(&when, &mut events, &mut seen_ids);
        }

        Ok(events)
    }
}

fn fetch_window(when: &str, events: &mut Vec<Event>, seen_ids: &mut HashSet<i64>) {
    let data = match net::get_json(BASE_URL, &[("what", TEATRO_CATEGORY), ("when", when)]) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("[{NAME}] failed to fetch when={when}: {e:#}");
            return;
        }
    };

    // result.events[].tipo_evento[].events[]
    let Some(day_blocks) = data["result"]["events"].as_array() else { return };
    for day in day_blocks {
        let Some(tipi) = day["tipo_evento"].as_array() else { continue };
        for tipo in tipi {
            let Some(items) = tipo["events"].as_array() else { continue };
            for item in items {
                let Some(id) = item["id"].as_i64() else { continue };
                if !seen_ids.insert(id) {
                    continue;
                }
                if let Some(ev) = parse_event(item) {
                    events.push(ev);
                }
            }
        }
    }
}

fn parse_event(item: &Value) -> Option<Event> {
    let title = item["name"].as_str().unwrap_or("").trim().to_string();
    if title.is_empty() {
        return None;
    }

    // Date comes as an identifier like "2026-2-9", not zero-padded.
    let date = date_from_identifier(item["identifier"].as_str().unwrap_or(""))?;

    let orario = item["orario_svolgimento"].as_str().unwrap_or("");
    let time = extract_time(orario);

    let venue = first_name(&item["luogo_della_cultura"]);
    let location = first_name(&item["comune"]);
    let source_url = item["href"].as_str().unwrap_or("").to_string();

    // Description: iniziativa names plus the raw orario text.
    let mut desc_parts: Vec<String> = Vec::new();
    if let Some(iniziative) = item["iniziativa"].as_array() {
        for iniz in iniziative {
            if let Some(name) = iniz["name"].as_str() {
                if !name.is_empty() {
                    desc_parts.push(name.to_string());
                }
            }
        }
    }
    let orario = orario.trim();
    if !orario.is_empty() {
        desc_parts.push(orario.to_string());
    }

    let mut ev = Event::new(title, date, time, venue, location, source_url, NAME);
    if !desc_parts.is_empty() {
        ev.description = Some(desc_parts.join(" | "));
    }
    Some(ev)
}

fn date_from_identifier(identifier: &str) -> Option<String> {
    let parts: Vec<&str> = identifier.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    let year: i32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let day: u32 = parts[2].parse().ok()?;
    chrono::NaiveDate::from_ymd_opt(year, month, day).map(|d| d.to_string())
}

fn first_name(list: &Value) -> String {
    list.as_array()
        .and_then(|a| a.first())
        .and_then(|v| v["name"].as_str())
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_dates_are_zero_padded() {
        assert_eq!(date_from_identifier("2026-2-9").as_deref(), Some("2026-02-09"));
        assert_eq!(date_from_identifier("2026-12-31").as_deref(), Some("2026-12-31"));
        assert_eq!(date_from_identifier("2026-2"), None);
        assert_eq!(date_from_identifier("2026-13-01"), None);
    }

    #[test]
    fn parses_api_item() {
        let item: Value = serde_json::from_str(
            r#"{
                "id": 7, "name": " Amleto ", "identifier": "2026-2-9",
                "orario_svolgimento": "ore 10.00 e ore 20.30",
                "luogo_della_cultura": [{"name": "Teatro Cuminetti"}],
                "comune": [{"name": "Trento"}],
                "href": "https://www.cultura.trentino.it/e/7",
                "iniziativa": [{"name": "Stagione di prosa"}]
            }"#,
        )
        .unwrap();
        let ev = parse_event(&item).unwrap();
        assert_eq!(ev.title, "Amleto");
        assert_eq!(ev.date, "2026-02-09");
        assert_eq!(ev.time.as_deref(), Some("10:00"));
        assert_eq!(ev.venue, "Teatro Cuminetti");
        assert_eq!(ev.location, "Trento");
        assert_eq!(
            ev.description.as_deref(),
            Some("Stagione di prosa | ore 10.00 e ore 20.30")
        );
    }

    #[test]
    fn untitled_items_are_dropped() {
        let item: Value =
            serde_json::from_str(r#"{"id": 8, "name": "  ", "identifier": "2026-2-9"}"#).unwrap();
        assert!(parse_event(&item).is_none());
    }
}
