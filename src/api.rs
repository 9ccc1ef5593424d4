//! Synchronous client for the **World Bank Indicators API (v2)**.
//!
//! This module queries the `country/all/indicator/{code}` endpoint for one
//! indicator over an inclusive year range and returns flattened [`RawRow`]s.
//!
//! ### Notes
//! - One request per fetch. `per_page` is sized so a full GDP per capita
//!   series fits on one page; if the API still reports more pages a warning
//!   is logged and only the first page is used.
//! - The API sometimes serializes `per_page` as a **string**; we accept both string/number.
//! - Records with a `null` value are skipped, not zero-filled.
//! - Timeouts come from [`RemoteConfig`] (20s total, 10s connect by default).
//!
//! Typical usage:
//! ```no_run
//! # use prosperity_rs::{Client, config::RemoteConfig};
//! let client = Client::new(&RemoteConfig::default())?;
//! let batch = client.fetch_range("NY.GDP.PCAP.CD", 2000, 2020)?;
//! println!("{} rows, {} dropped", batch.rows.len(), batch.dropped);
//! # Ok::<(), prosperity_rs::error::SourceError>(())
//! ```
use crate::config::RemoteConfig;
use crate::error::SourceError;
use crate::models::{Entry, Meta, RawBatch, RawRow};
use log::{debug, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    per_page: u32,
    http: HttpClient,
}

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Pauses between the three attempts of a request.
const RETRY_BACKOFF_MS: [u64; 2] = [100, 300];

fn enc(code: &str) -> String {
    percent_encoding::utf8_percent_encode(code.trim(), SAFE).to_string()
}

impl Client {
    pub fn new(cfg: &RemoteConfig) -> Result<Self, SourceError> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs)) // total request timeout
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("prosperity-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            per_page: cfg.per_page,
            http,
        })
    }

    /// Full request URL for one indicator and inclusive year range.
    pub fn indicator_url(&self, indicator: &str, start_year: i32, end_year: i32) -> String {
        format!(
            "{}/country/all/indicator/{}?date={}:{}&format=json&per_page={}",
            self.base_url,
            enc(indicator),
            start_year,
            end_year,
            self.per_page
        )
    }

    /// Fetch `indicator` observations for every region between `start_year`
    /// and `end_year` (inclusive).
    ///
    /// ### Errors
    /// - [`SourceError::FetchFailed`] on timeout or connection failure
    /// - [`SourceError::HttpStatus`] on a non-success response
    /// - [`SourceError::NoData`] when the envelope is malformed or empty
    pub fn fetch_range(
        &self,
        indicator: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<RawBatch, SourceError> {
        let url = self.indicator_url(indicator, start_year, end_year);
        debug!("GET {url}");
        let v = self.get_json(&url)?;
        parse_envelope(&v)
    }

    // Small retry for transient failures (5xx / connection errors). Timeouts
    // are final so the overall wait stays bounded.
    fn get_json(&self, url: &str) -> Result<Value, SourceError> {
        let mut last_err: Option<SourceError> = None;
        for attempt in 0..=RETRY_BACKOFF_MS.len() {
            match self.http.get(url).send() {
                Ok(r) if r.status().is_success() => {
                    return r
                        .json()
                        .map_err(|e| SourceError::NoData(format!("decode json: {e}")));
                }
                Ok(r) if r.status().is_server_error() => {
                    debug!("HTTP {} from {url}, retrying", r.status());
                    last_err = Some(SourceError::HttpStatus(r.status().as_u16()));
                }
                Ok(r) => return Err(SourceError::HttpStatus(r.status().as_u16())),
                Err(e) if e.is_timeout() => return Err(e.into()),
                Err(e) => {
                    debug!("request to {url} failed: {e}, retrying");
                    last_err = Some(e.into());
                }
            }
            // no pause after the final attempt
            if let Some(ms) = RETRY_BACKOFF_MS.get(attempt) {
                std::thread::sleep(Duration::from_millis(*ms));
            }
        }
        Err(last_err.unwrap_or_else(|| SourceError::NoData("no response".into())))
    }
}

/// Parse the API's `[meta, records]` envelope into rows.
///
/// A malformed envelope fails as a whole; a malformed record only drops
/// itself.
pub fn parse_envelope(v: &Value) -> Result<RawBatch, SourceError> {
    // The API returns an array: [Meta, [Entry, ...]] or a "message" object in position 0 on error.
    let arr = v
        .as_array()
        .ok_or_else(|| SourceError::NoData("unexpected response shape: not a top-level array".into()))?;
    let Some(head) = arr.first() else {
        return Err(SourceError::NoData("unexpected response: empty array".into()));
    };
    if let Some(msg) = head.get("message") {
        return Err(SourceError::NoData(format!("world bank api error: {msg}")));
    }
    if arr.len() != 2 {
        return Err(SourceError::NoData(format!(
            "expected [metadata, records], got {} elements",
            arr.len()
        )));
    }

    match serde_json::from_value::<Meta>(head.clone()) {
        Ok(meta) if meta.pages > 1 => warn!(
            "response spans {} pages ({} records), only page {} was read; raise per_page",
            meta.pages, meta.total, meta.page
        ),
        Ok(_) => {}
        Err(e) => debug!("could not parse paging metadata: {e}"),
    }

    let records = match &arr[1] {
        Value::Array(records) if !records.is_empty() => records,
        _ => return Err(SourceError::NoData("records slot is empty or absent".into())),
    };

    let mut batch = RawBatch::default();
    for rec in records {
        let row = serde_json::from_value::<Entry>(rec.clone())
            .ok()
            .and_then(|e| RawRow::try_from(e).ok());
        match row {
            Some(row) => batch.rows.push(row),
            None => batch.dropped += 1,
        }
    }
    debug!(
        "parsed {} rows from API response, dropped {}",
        batch.rows.len(),
        batch.dropped
    );
    Ok(batch)
}
