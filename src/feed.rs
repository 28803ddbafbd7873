// src/feed.rs
// Output contract with the frontend. Field set and sort order are stable;
// the file is replaced atomically so readers never see a partial feed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::event::Event;

#[derive(Serialize)]
pub struct FeedEvent {
    pub id: String,
    pub title: String,
    pub date: String,
    pub time: Option<String>,
    pub venue: String,
    pub location: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub source_url: String,
    pub source_urls: Vec<String>,
    pub source_name: String,
    pub is_past: bool,
}

impl From<&Event> for FeedEvent {
    fn from(e: &Event) -> Self {
        FeedEvent {
            id: e.id(),
            title: e.title.clone(),
            date: e.date.clone(),
            time: e.time.clone(),
            venue: e.venue.clone(),
            location: e.location.clone(),
            description: e.description.clone(),
            image_url: e.image_url.clone(),
            source_url: e.source_urls.first().cloned().unwrap_or_default(),
            source_urls: e.source_urls.clone(),
            source_name: e.source_name.to_string(),
            is_past: e.is_past(),
        }
    }
}

#[derive(Serialize)]
pub struct Feed {
    pub last_updated: String,
    pub count: usize,
    pub events: Vec<FeedEvent>,
}

/// Date ascending, then time ascending with absent time first.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| {
        (a.date.as_str(), a.time.as_deref().unwrap_or(""))
            .cmp(&(b.date.as_str(), b.time.as_deref().unwrap_or("")))
    });
}

impl Feed {
    pub fn build(events: &[Event]) -> Feed {
        Feed {
            last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            count: events.len(),
            events: events.iter().map(FeedEvent::from).collect(),
        }
    }

    /// Serialize pretty-printed and replace `dir/file` atomically:
    /// write a temp file in the same directory, then rename over the target.
    pub fn write(&self, dir: &Path, file: &str) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(self).context("serializing feed")?;

        fs::create_dir_all(dir)
            .with_context(|| format!("creating output dir {}", dir.display()))?;
        let target = dir.join(file);
        let tmp = dir.join(format!("{file}.tmp"));
        fs::write(&tmp, json.as_bytes())
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &target)
            .with_context(|| format!("replacing {}", target.display()))?;
        Ok(target)
    }
}
