// src/lib.rs

pub mod config;
pub mod core;

pub mod dedup;
pub mod event;
pub mod feed;
pub mod logging;
pub mod runner;
pub mod scrape;
