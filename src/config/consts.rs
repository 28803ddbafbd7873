// src/config/consts.rs

// Net config
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const ACCEPT_LANGUAGE: &str = "it-IT,it;q=0.9,en;q=0.8";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const MAX_ATTEMPTS: u32 = 3;
pub const BACKOFF_BASE_MS: u64 = 500;

// Output
pub const OUTPUT_DIR: &str = "docs";
pub const OUTPUT_FILE: &str = "events.json";

// Concurrency
pub const WORKERS: usize = 4;
