// src/runner.rs
// The aggregation driver: run every registered scraper, concatenate in
// registry order, deduplicate once over the combined list, sort, emit.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;

use anyhow::{Context, Result};

use crate::config::consts::{OUTPUT_DIR, OUTPUT_FILE, WORKERS};
use crate::dedup::deduplicate;
use crate::event::Event;
use crate::feed::{Feed, sort_events};
use crate::scrape::{self, Scraper};

/// What a run produced.
pub struct RunSummary {
    pub scraped: usize,
    pub unique: usize,
    pub written: PathBuf,
}

pub fn run() -> Result<RunSummary> {
    run_to(Path::new(OUTPUT_DIR), OUTPUT_FILE)
}

pub fn run_to(dir: &Path, file: &str) -> Result<RunSummary> {
    let all_events = collect_all(scrape::all());
    let scraped = all_events.len();
    log::info!("total events before dedup: {scraped}");

    let mut unique = deduplicate(all_events);
    log::info!("total events after dedup: {}", unique.len());

    sort_events(&mut unique);

    let feed = Feed::build(&unique);
    let written = feed.write(dir, file).context("writing feed")?;
    log::info!("written {} events to {}", unique.len(), written.display());

    Ok(RunSummary { scraped, unique: unique.len(), written })
}

/// Run every scraper on a small worker pool. Each `Scraper::run` contains
/// its own failures, so workers only ever send event lists. Results carry
/// their registry index and are re-ordered before concatenation, keeping
/// the combined list identical to a sequential run — dedup outcomes depend
/// on first-seen order.
fn collect_all(scrapers: Vec<Box<dyn Scraper>>) -> Vec<Event> {
    let count = scrapers.len();
    let scrapers = Arc::new(scrapers);
    let next = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::channel::<(usize, Vec<Event>)>();

    let workers = WORKERS.min(count).max(1);
    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let scrapers = Arc::clone(&scrapers);
        let next = Arc::clone(&next);
        let tx = tx.clone();
        handles.push(thread::spawn(move || {
            loop {
                let i = next.fetch_add(1, Ordering::Relaxed);
                if i >= scrapers.len() {
                    break;
                }
                let _ = tx.send((i, scrapers[i].run()));
            }
        }));
    }
    drop(tx); // main thread is sole receiver now

    let mut per_source: Vec<(usize, Vec<Event>)> = rx.iter().collect();
    for h in handles {
        let _ = h.join();
    }
    per_source.sort_by_key(|(i, _)| *i);

    per_source.into_iter().flat_map(|(_, events)| events).collect()
}
