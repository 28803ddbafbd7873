// src/scrape/santa_chiara.rs

use anyhow::Result;

use crate::event::Event;

use super::Scraper;

const NAME: &str = "centrosantachiara.it";
#[allow(dead_code)]
const CALENDAR_URL: &str = "https://www.centrosantachiara.it/spettacoli/calendariospettacoli";

pub struct SantaChiara;

impl Scraper for SantaChiara {
    fn name(&self) -> &'static str {
        NAME
    }

    // TODO: parse the season calendar at CALENDAR_URL once its card markup
    // has been mapped (title/date/time/venue per card).
    fn scrape(&self) -> Result<Vec<Event>> {
        log::info!("[{NAME}] scraper not yet implemented");
        Ok(Vec::new())
    }
}
