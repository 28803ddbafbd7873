// tests/feed.rs
// Output contract: field set, sort order, atomic file replacement.

use serde_json::Value;
use teatri_scrape::event::Event;
use teatri_scrape::feed::{Feed, sort_events};

fn ev(title: &str, date: &str, time: Option<&str>) -> Event {
    let mut e = Event::new(
        title.into(),
        date.into(),
        time.map(str::to_string),
        "Teatro Sociale".into(),
        "Trento".into(),
        format!("https://test.it/{}", title.to_lowercase()),
        "test.it",
    );
    e.description = Some("desc".into());
    e
}

#[test]
fn sort_puts_unspecified_time_first() {
    let mut events = vec![
        ev("c", "2026-02-10", Some("09:00")),
        ev("b", "2026-02-09", Some("20:30")),
        ev("a", "2026-02-09", None),
        ev("d", "2026-02-09", Some("10:00")),
    ];
    sort_events(&mut events);
    let order: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(order, vec!["a", "d", "b", "c"]);
}

#[test]
fn feed_json_has_the_contract_fields() {
    let events = vec![ev("Amleto", "2020-02-09", Some("20:30"))];
    let feed = Feed::build(&events);
    let json: Value = serde_json::from_str(&serde_json::to_string(&feed).unwrap()).unwrap();

    assert_eq!(json["count"], 1);
    assert!(json["last_updated"].as_str().unwrap().contains('T'));

    let e = &json["events"][0];
    assert_eq!(e["id"].as_str().unwrap().len(), 12);
    assert_eq!(e["title"], "Amleto");
    assert_eq!(e["date"], "2020-02-09");
    assert_eq!(e["time"], "20:30");
    assert_eq!(e["venue"], "Teatro Sociale");
    assert_eq!(e["location"], "Trento");
    assert_eq!(e["description"], "desc");
    assert_eq!(e["image_url"], Value::Null);
    assert_eq!(e["source_url"], "https://test.it/amleto");
    assert_eq!(e["source_urls"][0], "https://test.it/amleto");
    assert_eq!(e["source_name"], "test.it");
    assert_eq!(e["is_past"], true);
}

#[test]
fn absent_time_serializes_as_null() {
    let feed = Feed::build(&[ev("Amleto", "2999-02-09", None)]);
    let json: Value = serde_json::from_str(&serde_json::to_string(&feed).unwrap()).unwrap();
    assert_eq!(json["events"][0]["time"], Value::Null);
    assert_eq!(json["events"][0]["is_past"], false);
}

#[test]
fn source_url_is_first_of_source_urls() {
    let mut e = ev("Amleto", "2026-02-09", None);
    e.push_url("https://other.it/amleto");
    let feed = Feed::build(&[e]);
    let json: Value = serde_json::from_str(&serde_json::to_string(&feed).unwrap()).unwrap();
    assert_eq!(json["events"][0]["source_url"], "https://test.it/amleto");
    assert_eq!(json["events"][0]["source_urls"].as_array().unwrap().len(), 2);
}

#[test]
fn write_replaces_file_and_leaves_no_temp() {
    let dir = tempfile::tempdir().unwrap();

    let feed = Feed::build(&[ev("Amleto", "2026-02-09", None)]);
    let path = feed.write(dir.path(), "events.json").unwrap();
    let feed2 = Feed::build(&[ev("Otello", "2026-03-01", None), ev("Aida", "2026-03-02", None)]);
    feed2.write(dir.path(), "events.json").unwrap();

    let json: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["count"], 2);
    assert_eq!(json["events"][0]["title"], "Otello");

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["events.json"]);
}

#[test]
fn non_ascii_text_survives_serialization() {
    let feed = Feed::build(&[ev("La Bohème", "2026-02-09", None)]);
    let out = serde_json::to_string_pretty(&feed).unwrap();
    assert!(out.contains("La Bohème"));
}
