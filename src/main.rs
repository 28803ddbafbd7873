// src/main.rs
// Aggregator entry point. Takes no arguments: scrapes every registered
// source, deduplicates, and (over)writes docs/events.json.

use teatri_scrape::{logging, runner};

fn main() {
    logging::init();

    match runner::run() {
        Ok(summary) => {
            log::info!(
                "done: {} scraped, {} unique, feed at {}",
                summary.scraped,
                summary.unique,
                summary.written.display()
            );
        }
        Err(e) => {
            log::error!("run failed: {e:#}");
            std::process::exit(1);
        }
    }
}
