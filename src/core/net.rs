// src/core/net.rs
// HTTP GET with the headers Italian event sites expect, plus a bounded
// retry loop: 5xx, 429 and transport errors are retried with linear
// backoff; any other 4xx is terminal.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::config::consts::{
    ACCEPT_LANGUAGE, BACKOFF_BASE_MS, MAX_ATTEMPTS, REQUEST_TIMEOUT_SECS, USER_AGENT,
};

static AGENT: Lazy<ureq::Agent> = Lazy::new(|| {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(10))
        .timeout_read(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .timeout_write(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
});

/// A fetched page: body plus response headers (names lowercased).
pub struct Response {
    pub body: String,
    pub headers: HashMap<String, String>,
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

fn retryable(code: u16) -> bool {
    code == 429 || (500..600).contains(&code)
}

/// GET `url` with query `params`, retrying transient failures.
pub fn get(url: &str, params: &[(&str, &str)]) -> Result<Response> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let mut req = AGENT
            .get(url)
            .set("User-Agent", USER_AGENT)
            .set("Accept-Language", ACCEPT_LANGUAGE);
        for (k, v) in params {
            req = req.query(k, v);
        }
        match req.call() {
            Ok(resp) => {
                let mut headers = HashMap::new();
                for name in resp.headers_names() {
                    if let Some(v) = resp.header(&name) {
                        headers.insert(name.to_ascii_lowercase(), v.to_string());
                    }
                }
                let body = resp
                    .into_string()
                    .with_context(|| format!("reading body of {url}"))?;
                return Ok(Response { body, headers });
            }
            Err(ureq::Error::Status(code, _)) if retryable(code) && attempt < MAX_ATTEMPTS => {
                log::warn!("HTTP {code} from {url}, retry {attempt}/{MAX_ATTEMPTS}");
            }
            Err(ureq::Error::Status(code, _)) => {
                bail!("HTTP {code} for {url}");
            }
            Err(ureq::Error::Transport(t)) if attempt < MAX_ATTEMPTS => {
                log::warn!("transport error from {url}: {t}, retry {attempt}/{MAX_ATTEMPTS}");
            }
            Err(e) => {
                return Err(anyhow::Error::from(e)).with_context(|| format!("fetching {url}"));
            }
        }
        thread::sleep(Duration::from_millis(BACKOFF_BASE_MS * attempt as u64));
    }
}

/// GET and parse the body as JSON.
pub fn get_json(url: &str, params: &[(&str, &str)]) -> Result<Value> {
    let resp = get(url, params)?;
    serde_json::from_str(&resp.body).with_context(|| format!("non-JSON response from {url}"))
}
