// src/scrape/mod.rs

mod crushsite;
mod cultura_trentino;
mod jsonld;
mod pergine;
mod santa_chiara;
mod trentino_spettacoli;
mod villazzano;

use anyhow::Result;

use crate::event::Event;

/// One source site. Implementations are bespoke and disposable — they
/// track third-party markup that changes without notice — so the contract
/// is the bare minimum: a stable name and "zero or more events".
pub trait Scraper: Send + Sync {
    /// Stable identifier, recorded as `source_name` on every event.
    fn name(&self) -> &'static str;

    fn scrape(&self) -> Result<Vec<Event>>;

    /// Run with error containment: a failing scraper logs and contributes
    /// zero events, never aborting the aggregation run.
    fn run(&self) -> Vec<Event> {
        match self.scrape() {
            Ok(events) => {
                log::info!("[{}] scraped {} events", self.name(), events.len());
                events
            }
            Err(e) => {
                log::error!("[{}] scraping failed: {e:#}", self.name());
                Vec::new()
            }
        }
    }
}

/// Registry, in iteration order. Order matters: on duplicate events the
/// first source's values win for everything but the enrichment fields.
pub fn all() -> Vec<Box<dyn Scraper>> {
    vec![
        Box::new(cultura_trentino::CulturaTrentino),
        Box::new(santa_chiara::SantaChiara),
        Box::new(villazzano::Villazzano),
        Box::new(pergine::Pergine),
        Box::new(trentino_spettacoli::TrentinoSpettacoli),
        Box::new(crushsite::Crushsite),
    ]
}
