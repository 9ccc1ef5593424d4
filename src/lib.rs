//! prosperity_rs
//!
//! A lightweight Rust library for loading World Bank GDP per capita data,
//! separating true countries from aggregate regions, and deriving summary
//! series. Pairs with the `prosperity` CLI.
//!
//! ### Features
//! - Fetch the indicator from the World Bank API, falling back to a local CSV
//! - Exclude aggregates (continents, income tiers, demographic cohorts, world totals)
//! - Global yearly average, trend summary, region vs world, rich/poor gap
//! - Save the cleaned table as CSV or JSON
//!
//! ### Example
//! ```no_run
//! use prosperity_rs::{AppConfig, DatasetLoader, stats};
//!
//! let loader = DatasetLoader::from_config(&AppConfig::default());
//! let data = loader.load(true)?;
//! let trend = stats::trend_summary(&data.observations)?;
//! println!("{} -> {}: {:.1}%", trend.first_year, trend.last_year, trend.growth_pct);
//! for row in stats::rich_poor_gap(&data.observations) {
//!     println!("{}: {} / {}", row.year, row.richest_region, row.poorest_region);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod loader;
pub mod local;
pub mod models;
pub mod source;
pub mod stats;
pub mod storage;

pub use api::Client;
pub use classify::{RegionClassifier, Taxonomy};
pub use config::AppConfig;
pub use loader::{Dataset, DatasetLoader};
pub use models::{GroupType, Observation, RawBatch, RawRow};
pub use source::{LocalSource, RawSource, RemoteSource, SourceKind};
