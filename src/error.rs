use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single data source. The loader recovers from these by
/// falling back to the other source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Timeout, connection failure or any other transport-level problem.
    #[error("fetch failed: {0}")]
    FetchFailed(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("request failed with HTTP {0}")]
    HttpStatus(u16),

    /// The source could not be set up, e.g. the HTTP client failed to build.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The response envelope was malformed or carried no records.
    #[error("no data: {0}")]
    NoData(String),

    /// The local file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The local file is not valid CSV.
    #[error("invalid CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The local file lacks one of the required header columns.
    #[error("{path} is missing required column {column}")]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Both sources were exhausted.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not load data (remote: {}; local: {local})", remote_reason(.remote))]
    LoadFailed {
        /// `None` when the remote source was not attempted.
        remote: Option<SourceError>,
        local: SourceError,
    },
}

fn remote_reason(remote: &Option<SourceError>) -> String {
    match remote {
        Some(e) => e.to_string(),
        None => "not attempted".to_string(),
    }
}

/// A derived series could not be computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    #[error("series is empty")]
    EmptySeries,

    /// Growth relative to a zero base is undefined.
    #[error("growth undefined: average for base year {year} is zero")]
    ZeroBase { year: i32 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
