// src/scrape/pergine.rs

use anyhow::Result;

use crate::event::Event;

use super::Scraper;

const NAME: &str = "teatrodipergine.it";
#[allow(dead_code)]
const SEASON_URL: &str = "https://www.teatrodipergine.it/stagione-2013-2014-3";

pub struct Pergine;

impl Scraper for Pergine {
    fn name(&self) -> &'static str {
        NAME
    }

    // TODO: the site is a Joomla install; either parse the season page at
    // SEASON_URL or walk the blog_calendar component month by month.
    fn scrape(&self) -> Result<Vec<Event>> {
        log::info!("[{NAME}] scraper not yet implemented");
        Ok(Vec::new())
    }
}
