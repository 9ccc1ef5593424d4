use serde::{Deserialize, Serialize};
use std::fmt;

/// GDP per capita at or above this value counts as high income.
pub const DEFAULT_HIGH_INCOME_THRESHOLD: f64 = 40_000.0;

/// Metadata section returned by the API (position 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub page: u32,
    pub pages: u32,
    /// Some responses encode `per_page` as a string, others as a number.
    /// Accept both and normalize to `u32`.
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub per_page: u32,
    pub total: u32,
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(E::custom)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(|_| E::custom("negative or oversized value for u32"))
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeName {
    #[serde(default)]
    pub id: String,
    pub value: String,
}

/// Raw record from the API (position 1 array).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub country: CodeName,
    #[serde(default)]
    pub countryiso3code: String,
    pub date: String,
    pub value: Option<f64>,
}

/// Source-neutral row, before classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRow {
    pub region_code: String,
    pub region_name: String,
    pub year: i32,
    pub gdp_per_capita: f64,
}

impl TryFrom<Entry> for RawRow {
    type Error = Entry;

    /// Fails (handing the entry back) when the value is null or the year
    /// is not a whole number.
    fn try_from(e: Entry) -> Result<Self, Self::Error> {
        let (Some(year), Some(value)) = (parse_year(&e.date), e.value.filter(|v| v.is_finite()))
        else {
            return Err(e);
        };
        Ok(Self {
            region_code: e.countryiso3code,
            region_name: e.country.value,
            year,
            gdp_per_capita: value,
        })
    }
}

/// Rows produced by one source, plus how many it had to discard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBatch {
    pub rows: Vec<RawRow>,
    pub dropped: usize,
}

/// Semantic partition a region label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    Geographic,
    IncomeGroup,
    DemographicGroup,
    /// Anything not in a known aggregate set, i.e. a true country.
    Other,
    /// `Other` after the loader has relabelled it.
    Country,
}

impl GroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupType::Geographic => "geographic",
            GroupType::IncomeGroup => "income_group",
            GroupType::DemographicGroup => "demographic_group",
            GroupType::Other => "other",
            GroupType::Country => "country",
        }
    }

    /// True for the categories that denote a composite of several countries.
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            GroupType::Geographic | GroupType::IncomeGroup | GroupType::DemographicGroup
        )
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the canonical table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub region_code: String,
    pub region_name: String,
    pub year: i32,
    pub gdp_per_capita: f64,
    pub group_type: GroupType,
}

impl Observation {
    pub fn from_raw(row: RawRow, group_type: GroupType) -> Self {
        Self {
            region_code: row.region_code,
            region_name: row.region_name,
            year: row.year,
            gdp_per_capita: row.gdp_per_capita,
            group_type,
        }
    }

    pub fn is_high_income(&self, threshold: f64) -> bool {
        self.gdp_per_capita >= threshold
    }
}

/// Parse a year field. Accepts `"2020"` and whole floats like `"2020.0"`.
pub fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

/// Parse a GDP value. Empty, unparseable and non-finite inputs yield `None`.
pub fn parse_value(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
