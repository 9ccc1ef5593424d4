//! Produces the canonical, country-only table from whichever source works.

use crate::classify::RegionClassifier;
use crate::config::AppConfig;
use crate::error::{LoadError, SourceError};
use crate::models::{GroupType, Observation, RawBatch};
use crate::source::{LocalSource, RawSource, RemoteSource, SourceKind};
use log::{info, warn};

/// The canonical table: country observations only, plus what was discarded
/// on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub observations: Vec<Observation>,
    pub source: SourceKind,
    /// Rows the source could not coerce (bad year, missing value, ...).
    pub dropped_rows: usize,
    /// Rows classified as aggregates and excluded.
    pub excluded_aggregates: usize,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

pub struct DatasetLoader {
    classifier: RegionClassifier,
    /// Why there is no remote source, when there is none.
    remote: Result<Box<dyn RawSource>, String>,
    local: Box<dyn RawSource>,
}

impl DatasetLoader {
    pub fn new(
        classifier: RegionClassifier,
        remote: Option<Box<dyn RawSource>>,
        local: Box<dyn RawSource>,
    ) -> Self {
        Self {
            classifier,
            remote: remote.ok_or_else(|| "no remote source configured".to_string()),
            local,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        let remote = RemoteSource::from_config(&cfg.remote).map_err(|e| {
            warn!("remote source unavailable: {e}");
            e.to_string()
        });
        Self {
            classifier: RegionClassifier::new(cfg.taxonomy()),
            remote: remote.map(|r| Box::new(r) as Box<dyn RawSource>),
            local: Box::new(LocalSource::new(&cfg.fallback_path)),
        }
    }

    pub fn classifier(&self) -> &RegionClassifier {
        &self.classifier
    }

    /// Load a fresh snapshot.
    ///
    /// With `use_remote` the API is tried first and the local file is the
    /// fallback; otherwise only the local file is read. An aggregate-only
    /// input yields an empty but valid [`Dataset`].
    pub fn load(&self, use_remote: bool) -> Result<Dataset, LoadError> {
        let mut remote_err = None;
        if use_remote {
            match &self.remote {
                Ok(src) => match src.fetch() {
                    Ok(batch) => return Ok(self.canonicalize(batch, src.kind())),
                    Err(e) => {
                        warn!(
                            "remote source {} failed: {e}; falling back to {}",
                            src.describe(),
                            self.local.describe()
                        );
                        remote_err = Some(e);
                    }
                },
                Err(reason) => remote_err = Some(SourceError::Unavailable(reason.clone())),
            }
        }
        match self.local.fetch() {
            Ok(batch) => Ok(self.canonicalize(batch, self.local.kind())),
            Err(local) => Err(LoadError::LoadFailed {
                remote: remote_err,
                local,
            }),
        }
    }

    /// Classify every row, keep the `Other` partition, relabel it `Country`.
    pub fn canonicalize(&self, batch: RawBatch, source: SourceKind) -> Dataset {
        let total = batch.rows.len();
        let observations: Vec<Observation> = batch
            .rows
            .into_iter()
            .map(|row| {
                let group = self.classifier.classify(&row.region_name);
                (row, group)
            })
            .filter(|(_, group)| *group == GroupType::Other)
            .map(|(row, _)| Observation::from_raw(row, GroupType::Country))
            .collect();
        let excluded_aggregates = total - observations.len();

        if observations.is_empty() && total > 0 {
            warn!("{source} source returned {total} rows but none are countries");
        }
        info!(
            "loaded {} country rows from {source} source ({} aggregates excluded, {} rows dropped)",
            observations.len(),
            excluded_aggregates,
            batch.dropped
        );
        Dataset {
            observations,
            source,
            dropped_rows: batch.dropped,
            excluded_aggregates,
        }
    }
}
