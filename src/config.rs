use crate::classify::Taxonomy;
use crate::error::ConfigError;
use ahash::AHashSet;
use chrono::Datelike;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// GDP per capita (current US$).
pub const DEFAULT_INDICATOR: &str = "NY.GDP.PCAP.CD";
pub const DEFAULT_FALLBACK_PATH: &str = "data/gdp_per_capita.csv";

/// Settings for the World Bank API source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub indicator: String,
    pub start_year: i32,
    pub end_year: i32,
    /// Large enough that ~270 regions x 65 years fit on one page.
    pub per_page: u32,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.worldbank.org/v2".into(),
            indicator: DEFAULT_INDICATOR.into(),
            start_year: 1960,
            end_year: chrono::Utc::now().year(),
            per_page: 20_000,
            timeout_secs: 20,
            connect_timeout_secs: 10,
        }
    }
}

/// Per-set replacements for the built-in aggregate-region names. A set
/// left out keeps its built-in names; an empty list clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxonomyOverrides {
    pub geographic: Option<AHashSet<String>>,
    pub income_group: Option<AHashSet<String>>,
    pub demographic_group: Option<AHashSet<String>>,
}

impl TaxonomyOverrides {
    pub fn apply(&self, base: Taxonomy) -> Taxonomy {
        Taxonomy {
            geographic: self.geographic.clone().unwrap_or(base.geographic),
            income_group: self.income_group.clone().unwrap_or(base.income_group),
            demographic_group: self
                .demographic_group
                .clone()
                .unwrap_or(base.demographic_group),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub fallback_path: PathBuf,
    pub taxonomy: Option<TaxonomyOverrides>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            fallback_path: PathBuf::from(DEFAULT_FALLBACK_PATH),
            taxonomy: None,
        }
    }
}

impl AppConfig {
    /// `<config dir>/prosperity/config.json`, if the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("prosperity").join("config.json"))
    }

    /// Load from an explicit path, or from the default location. A missing
    /// default file means built-in defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => match Self::default_config_path() {
                Some(p) if p.exists() => Self::load_from_path(&p),
                _ => {
                    debug!("no config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        debug!("loaded config from {}", path.display());
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.remote;
        if r.start_year > r.end_year {
            return Err(ConfigError::Invalid(format!(
                "start_year {} is after end_year {}",
                r.start_year, r.end_year
            )));
        }
        if r.indicator.trim().is_empty() {
            return Err(ConfigError::Invalid("indicator must not be empty".into()));
        }
        if r.per_page == 0 || r.timeout_secs == 0 || r.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "per_page, timeout_secs and connect_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Built-in sets with any configured overrides applied.
    pub fn taxonomy(&self) -> Taxonomy {
        match &self.taxonomy {
            Some(o) => o.apply(Taxonomy::world_bank()),
            None => Taxonomy::world_bank(),
        }
    }
}
