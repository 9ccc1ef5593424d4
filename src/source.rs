//! The two interchangeable raw-data sources behind one trait.

use crate::api::Client;
use crate::config::RemoteConfig;
use crate::error::SourceError;
use crate::local;
use crate::models::RawBatch;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Remote,
    Local,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceKind::Remote => "remote",
            SourceKind::Local => "local",
        })
    }
}

/// Anything that can produce raw rows in the canonical intermediate shape.
pub trait RawSource {
    fn kind(&self) -> SourceKind;

    /// Human-readable origin, for logs.
    fn describe(&self) -> String;

    fn fetch(&self) -> Result<RawBatch, SourceError>;
}

/// World Bank API for a fixed indicator and year range.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    client: Client,
    indicator: String,
    start_year: i32,
    end_year: i32,
}

impl RemoteSource {
    pub fn new(client: Client, indicator: impl Into<String>, start_year: i32, end_year: i32) -> Self {
        Self {
            client,
            indicator: indicator.into(),
            start_year,
            end_year,
        }
    }

    pub fn from_config(cfg: &RemoteConfig) -> Result<Self, SourceError> {
        Ok(Self::new(
            Client::new(cfg)?,
            cfg.indicator.clone(),
            cfg.start_year,
            cfg.end_year,
        ))
    }
}

impl RawSource for RemoteSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    fn describe(&self) -> String {
        format!(
            "{} {} {}:{}",
            self.client.base_url, self.indicator, self.start_year, self.end_year
        )
    }

    fn fetch(&self) -> Result<RawBatch, SourceError> {
        self.client
            .fetch_range(&self.indicator, self.start_year, self.end_year)
    }
}

/// SDMX-style CSV file on disk.
#[derive(Debug, Clone)]
pub struct LocalSource {
    path: PathBuf,
}

impl LocalSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RawSource for LocalSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Local
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<RawBatch, SourceError> {
        local::read_csv(&self.path)
    }
}
