//! Region classification: tells countries apart from aggregate regions.
//!
//! Membership is exact-string and case-sensitive. A name that is missing from
//! the taxonomy (or spelled differently, including whitespace) is classified
//! as [`GroupType::Other`] and ends up in the country partition, so the sets
//! must be reviewed whenever the upstream region taxonomy changes.

use crate::models::GroupType;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

const GEOGRAPHIC: &[&str] = &[
    "Africa Eastern and Southern",
    "Africa Western and Central",
    "East Asia & Pacific",
    "East Asia & Pacific (excluding high income)",
    "Europe & Central Asia",
    "Latin America & Caribbean",
    "Middle East & North Africa",
    "North America",
    "South Asia",
    "Sub-Saharan Africa",
    "Caribbean small states",
    "Euro area",
    "European Union",
    // World/area totals and regional variants returned by the API.
    "World",
    "Arab World",
    "Central Europe and the Baltics",
    "East Asia & Pacific (IDA & IBRD countries)",
    "Europe & Central Asia (excluding high income)",
    "Europe & Central Asia (IDA & IBRD countries)",
    "Latin America & Caribbean (excluding high income)",
    "Latin America & the Caribbean (IDA & IBRD countries)",
    "Middle East & North Africa (excluding high income)",
    "Middle East & North Africa (IDA & IBRD countries)",
    "Middle East, North Africa, Afghanistan & Pakistan",
    "South Asia (IDA & IBRD)",
    "Sub-Saharan Africa (excluding high income)",
    "Sub-Saharan Africa (IDA & IBRD countries)",
    "OECD members",
    "Small states",
    "Other small states",
    "Pacific island small states",
    "Fragile and conflict affected situations",
];

const INCOME: &[&str] = &[
    "High income",
    "Upper middle income",
    "Lower middle income",
    "Low income",
    // Lending and composite income groupings.
    "Middle income",
    "Low & middle income",
    "Not classified",
    "IBRD only",
    "IDA only",
    "IDA blend",
    "IDA total",
    "IDA & IBRD total",
    "Heavily indebted poor countries (HIPC)",
    "Least developed countries: UN classification",
];

const DEMOGRAPHIC: &[&str] = &[
    "Early-demographic dividend",
    "Late-demographic dividend",
    "Pre-demographic dividend",
    "Post-demographic dividend",
];

/// The three named sets of known aggregate-region names.
///
/// Deserializes from `{"geographic": [...], "income_group": [...],
/// "demographic_group": [...]}`; all three keys are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Taxonomy {
    pub geographic: AHashSet<String>,
    pub income_group: AHashSet<String>,
    pub demographic_group: AHashSet<String>,
}

impl Taxonomy {
    pub fn new<I, J, K, S>(geographic: I, income_group: J, demographic_group: K) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = S>,
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            geographic: geographic.into_iter().map(Into::into).collect(),
            income_group: income_group.into_iter().map(Into::into).collect(),
            demographic_group: demographic_group.into_iter().map(Into::into).collect(),
        }
    }

    /// Aggregate names used by the World Bank GDP per capita indicator.
    pub fn world_bank() -> Self {
        Self::new(
            GEOGRAPHIC.iter().copied(),
            INCOME.iter().copied(),
            DEMOGRAPHIC.iter().copied(),
        )
    }

    /// Every aggregate name paired with the category it belongs to.
    pub fn entries(&self) -> impl Iterator<Item = (&str, GroupType)> {
        let geo = self.geographic.iter().map(|s| (s.as_str(), GroupType::Geographic));
        let income = self.income_group.iter().map(|s| (s.as_str(), GroupType::IncomeGroup));
        let demo = self
            .demographic_group
            .iter()
            .map(|s| (s.as_str(), GroupType::DemographicGroup));
        geo.chain(income).chain(demo)
    }

    pub fn len(&self) -> usize {
        self.geographic.len() + self.income_group.len() + self.demographic_group.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::world_bank()
    }
}

/// Maps region labels to a [`GroupType`]. Never returns `Country`.
#[derive(Debug, Clone, Default)]
pub struct RegionClassifier {
    taxonomy: Taxonomy,
}

impl RegionClassifier {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn classify(&self, region_name: &str) -> GroupType {
        if self.taxonomy.geographic.contains(region_name) {
            GroupType::Geographic
        } else if self.taxonomy.income_group.contains(region_name) {
            GroupType::IncomeGroup
        } else if self.taxonomy.demographic_group.contains(region_name) {
            GroupType::DemographicGroup
        } else {
            GroupType::Other
        }
    }
}
