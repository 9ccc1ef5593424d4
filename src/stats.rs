//! Derived series over the canonical table. Everything here is a pure
//! function of its input and is recomputed on each call.

use crate::error::ComputeError;
use crate::models::Observation;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

/// First/last snapshot of a yearly series and the growth between them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrendSummary {
    pub first_year: i32,
    pub last_year: i32,
    pub first_value: f64,
    pub last_value: f64,
    pub growth_pct: f64,
}

/// One year of a region compared against the world average.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RegionVsWorld {
    pub year: i32,
    /// `None` when the region has no observation that year.
    pub region: Option<f64>,
    pub world: f64,
}

impl RegionVsWorld {
    /// Region minus world, if the region has data.
    pub fn gap(&self) -> Option<f64> {
        self.region.map(|r| r - self.world)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RichPoorGap {
    pub year: i32,
    pub richest_region: String,
    pub richest_value: f64,
    pub poorest_region: String,
    pub poorest_value: f64,
    pub gap: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GlobalStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub latest_year: i32,
}

fn mean(vals: &[f64]) -> f64 {
    vals.iter().sum::<f64>() / vals.len() as f64
}

fn by_year<'a>(obs: impl IntoIterator<Item = &'a Observation>) -> BTreeMap<i32, Vec<f64>> {
    let mut groups: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for o in obs {
        groups.entry(o.year).or_default().push(o.gdp_per_capita);
    }
    groups
}

/// Mean GDP per capita across all rows of each year, ascending by year.
pub fn yearly_average(obs: &[Observation]) -> Vec<YearValue> {
    by_year(obs)
        .into_iter()
        .map(|(year, vals)| YearValue {
            year,
            value: mean(&vals),
        })
        .collect()
}

/// Trend of the yearly average series of `obs`.
pub fn trend_summary(obs: &[Observation]) -> Result<TrendSummary, ComputeError> {
    trend_from_series(&yearly_average(obs))
}

/// Trend between the first and last entry of an ascending series.
pub fn trend_from_series(series: &[YearValue]) -> Result<TrendSummary, ComputeError> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(ComputeError::EmptySeries);
    };
    if first.value == 0.0 {
        return Err(ComputeError::ZeroBase { year: first.year });
    }
    Ok(TrendSummary {
        first_year: first.year,
        last_year: last.year,
        first_value: first.value,
        last_value: last.value,
        growth_pct: (last.value / first.value - 1.0) * 100.0,
    })
}

/// Region average next to the world average, one entry per world year.
pub fn region_vs_world(obs: &[Observation], region_name: &str) -> Vec<RegionVsWorld> {
    let region = by_year(obs.iter().filter(|o| o.region_name == region_name));
    yearly_average(obs)
        .into_iter()
        .map(|w| RegionVsWorld {
            year: w.year,
            region: region.get(&w.year).map(|v| mean(v)),
            world: w.value,
        })
        .collect()
}

/// Richest and poorest region of every year and the gap between them.
///
/// A region with several rows in one year is represented by their mean.
/// Ties go to the region seen first in `obs`.
pub fn rich_poor_gap(obs: &[Observation]) -> Vec<RichPoorGap> {
    // year -> regions in first-seen order, each with its values
    let mut years: BTreeMap<i32, Vec<(&str, Vec<f64>)>> = BTreeMap::new();
    let mut slot: AHashMap<(i32, &str), usize> = AHashMap::new();
    for o in obs {
        let regions = years.entry(o.year).or_default();
        let idx = *slot.entry((o.year, o.region_name.as_str())).or_insert_with(|| {
            regions.push((o.region_name.as_str(), Vec::new()));
            regions.len() - 1
        });
        regions[idx].1.push(o.gdp_per_capita);
    }

    years
        .into_iter()
        .filter_map(|(year, regions)| {
            let avgs: Vec<(&str, f64)> = regions.iter().map(|(n, v)| (*n, mean(v))).collect();
            let (mut rich, mut poor) = (*avgs.first()?, *avgs.first()?);
            for &(name, v) in &avgs[1..] {
                if v > rich.1 {
                    rich = (name, v);
                }
                if v < poor.1 {
                    poor = (name, v);
                }
            }
            Some(RichPoorGap {
                year,
                richest_region: rich.0.to_string(),
                richest_value: rich.1,
                poorest_region: poor.0.to_string(),
                poorest_value: poor.1,
                gap: rich.1 - poor.1,
            })
        })
        .collect()
}

/// Mean and spread over every observation, plus the most recent year.
pub fn global_stats(obs: &[Observation]) -> Option<GlobalStats> {
    let latest_year = obs.iter().map(|o| o.year).max()?;
    let vals: Vec<f64> = obs.iter().map(|o| o.gdp_per_capita).collect();
    let m = mean(&vals);
    let var = vals.iter().map(|v| (v - m).powi(2)).sum::<f64>() / vals.len() as f64;
    Some(GlobalStats {
        count: vals.len(),
        mean: m,
        std_dev: var.sqrt(),
        latest_year,
    })
}

/// The `n` highest observations of `year`, highest first.
pub fn top_regions(obs: &[Observation], year: i32, n: usize) -> Vec<(String, f64)> {
    let mut rows: Vec<(String, f64)> = obs
        .iter()
        .filter(|o| o.year == year)
        .map(|o| (o.region_name.clone(), o.gdp_per_capita))
        .collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));
    rows.truncate(n);
    rows
}

/// One region's values over time, ascending by year.
pub fn region_series(obs: &[Observation], region_name: &str) -> Vec<YearValue> {
    by_year(obs.iter().filter(|o| o.region_name == region_name))
        .into_iter()
        .map(|(year, vals)| YearValue {
            year,
            value: mean(&vals),
        })
        .collect()
}

/// Sorted, de-duplicated region names.
pub fn region_names(obs: &[Observation]) -> Vec<String> {
    let mut names: Vec<String> = obs.iter().map(|o| o.region_name.clone()).collect();
    names.sort();
    names.dedup();
    names
}
