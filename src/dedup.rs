// src/dedup.rs
// Collapses near-duplicate events coming from independent sites.
//
// Cluster key is deliberately coarse: exact date plus normalized-exact
// venue, then a fuzzy title match. Sources describe the same show with
// typos and subtitle differences but agree on date and venue once
// normalized; fuzzing date or venue would merge distinct showings.

use std::collections::HashMap;

use crate::core::sanitize::normalize;
use crate::event::Event;

pub const SIMILARITY_THRESHOLD: f64 = 0.80;

/// True when two raw titles describe the same show: equal after
/// normalization, or similarity ratio at/above the threshold. Symmetric.
pub fn titles_match(a: &str, b: &str) -> bool {
    let na = normalize(a);
    let nb = normalize(b);
    na == nb || similarity(&na, &nb) >= SIMILARITY_THRESHOLD
}

/// Ratcliff/Obershelp similarity over characters: `2M / T` where `M` is
/// the total length of the greedy longest-matching blocks and `T` the sum
/// of both lengths. Mirrors Python's `difflib.SequenceMatcher.ratio()`
/// (titles stay far below the length where its autojunk heuristic kicks
/// in), so threshold classifications agree with the historical feed.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    // char -> positions in b, ascending.
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &ch) in b.iter().enumerate() {
        b2j.entry(ch).or_default().push(j);
    }

    let mut matches = 0usize;
    let mut spans = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = spans.pop() {
        let (i, j, size) = longest_match(&a, &b2j, alo, ahi, blo, bhi);
        if size > 0 {
            matches += size;
            spans.push((alo, i, blo, j));
            spans.push((i + size, ahi, j + size, bhi));
        }
    }
    2.0 * matches as f64 / total as f64
}

/// Earliest longest matching block within `a[alo..ahi]` / `b[blo..bhi]`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0usize);
    // j -> length of the match ending at (i, j); rebuilt per row.
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for (i, &ch) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_j2len = HashMap::new();
        if let Some(positions) = b2j.get(&ch) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = if j == 0 { 1 } else { j2len.get(&(j - 1)).copied().unwrap_or(0) + 1 };
                next_j2len.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        j2len = next_j2len;
    }
    (best_i, best_j, best_size)
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

/// Fold `new` into `existing`. First-seen values win everywhere except the
/// two enrichment fields and the URL set. Only a filled value counts as
/// enrichment; `Some("")` from a sloppy source is treated as absent.
fn merge_events(existing: &mut Event, new: Event) {
    for url in &new.source_urls {
        existing.push_url(url);
    }
    if !filled(&existing.time) && filled(&new.time) {
        existing.time = new.time;
    }
    if !filled(&existing.description) && filled(&new.description) {
        existing.description = new.description;
    }
}

/// Single greedy pass: each record joins the first surviving cluster with
/// the same date, the same normalized venue and a matching title, else
/// starts a new cluster. Survivors keep first-appearance order.
pub fn deduplicate(events: Vec<Event>) -> Vec<Event> {
    let mut unique: Vec<Event> = Vec::new();
    for event in events {
        let slot = unique.iter().position(|existing| {
            event.date == existing.date
                && normalize(&event.venue) == normalize(&existing.venue)
                && titles_match(&event.title, &existing.title)
        });
        match slot {
            Some(i) => merge_events(&mut unique[i], event),
            None => unique.push(event),
        }
    }
    unique
}
