// src/scrape/jsonld.rs
// schema.org Event extraction from <script type="application/ld+json">
// blocks. Shared by every adapter with an HTML fallback path.

use serde_json::Value;

use crate::core::dates::split_datetime;
use crate::core::html;
use crate::event::Event;

const EVENT_TYPES: [&str; 4] = ["Event", "TheaterEvent", "DanceEvent", "MusicEvent"];

/// Site-specific fallbacks applied when a JSON-LD item omits a field.
pub struct Defaults {
    pub source_name: &'static str,
    pub base_url: &'static str,
    pub venue: &'static str,
    pub location: &'static str,
}

/// All schema.org events found in `page`. Malformed blocks are skipped;
/// a top-level array counts as a list of candidate items.
pub fn events_from_html(page: &str, defaults: &Defaults) -> Vec<Event> {
    let mut events = Vec::new();
    for block in html::jsonld_blocks(page) {
        let Ok(data) = serde_json::from_str::<Value>(block) else { continue };
        let items: Vec<&Value> = match &data {
            Value::Array(list) => list.iter().collect(),
            other => vec![other],
        };
        for item in items {
            let is_event = item["@type"]
                .as_str()
                .is_some_and(|t| EVENT_TYPES.contains(&t));
            if !is_event {
                continue;
            }
            if let Some(ev) = parse_event(item, defaults) {
                events.push(ev);
            }
        }
    }
    events
}

/// Map one schema.org Event object onto our record, or None when title
/// or start date is missing/unparseable.
pub fn parse_event(item: &Value, defaults: &Defaults) -> Option<Event> {
    let title = item["name"].as_str()?.trim().to_string();
    if title.is_empty() {
        return None;
    }
    let (date, time) = split_datetime(item["startDate"].as_str()?)?;

    let location_data = &item["location"];
    let mut venue = String::new();
    let mut city = String::new();
    match location_data {
        Value::Object(_) => {
            venue = location_data["name"].as_str().unwrap_or("").to_string();
            city = location_data["address"]["addressLocality"]
                .as_str()
                .unwrap_or("")
                .to_string();
        }
        Value::String(s) => venue = s.clone(),
        _ => {}
    }
    if venue.is_empty() {
        venue = defaults.venue.to_string();
    }
    if city.is_empty() {
        city = defaults.location.to_string();
    }

    let mut source_url = item["url"]
        .as_str()
        .or_else(|| item["@id"].as_str())
        .unwrap_or("")
        .to_string();
    if !source_url.is_empty() && !source_url.starts_with("http") {
        source_url = format!("{}{}", defaults.base_url, source_url);
    }

    let image_url = match &item["image"] {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        obj @ Value::Object(_) => obj["url"]
            .as_str()
            .or_else(|| obj["@id"].as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    };

    let mut ev = Event::new(title, date, time, venue, city, source_url, defaults.source_name);
    ev.description = item["description"].as_str().filter(|s| !s.is_empty()).map(str::to_string);
    ev.image_url = image_url;
    Some(ev)
}
