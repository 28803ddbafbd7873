// src/core/sanitize.rs

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WS_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Canonical text form used for venue/title comparison and identity keys.
/// Lowercase, punctuation and symbols removed (Unicode letters kept),
/// whitespace runs collapsed to one space, edges trimmed.
///
/// Total and idempotent; whitespace-only input becomes the empty string.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lower, "");
    WS_RUN.replace_all(&stripped, " ").trim().to_string()
}

pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#8217;", "’")
        .replace("&#039;", "'")
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}
