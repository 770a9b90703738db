use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum-distance filter band.
///
/// Parsing never fails: `"all"` (or an empty string) means no restriction, a
/// non-negative finite number is a ceiling in kilometers, and anything else is
/// kept verbatim as [`DistanceBand::Invalid`] so the filter can skip it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DistanceBand {
    #[default]
    All,
    Km(f64),
    Invalid(String),
}

impl DistanceBand {
    /// The ceiling in kilometers, or `None` when the band does not restrict.
    #[must_use]
    pub fn ceiling_km(&self) -> Option<f64> {
        match self {
            DistanceBand::Km(km) => Some(*km),
            DistanceBand::All | DistanceBand::Invalid(_) => None,
        }
    }
}

impl FromStr for DistanceBand {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(DistanceBand::All);
        }
        let numeric = trimmed
            .strip_suffix("km")
            .map_or(trimmed, str::trim_end);
        match numeric.parse::<f64>() {
            Ok(km) if km.is_finite() && km >= 0.0 => Ok(DistanceBand::Km(km)),
            _ => Ok(DistanceBand::Invalid(s.to_string())),
        }
    }
}

impl From<String> for DistanceBand {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(band) => band,
            Err(never) => match never {},
        }
    }
}

impl From<DistanceBand> for String {
    fn from(value: DistanceBand) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for DistanceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistanceBand::All => write!(f, "all"),
            DistanceBand::Km(km) => write!(f, "{km}"),
            DistanceBand::Invalid(raw) => write!(f, "{raw}"),
        }
    }
}

/// The user's current filter selection.
///
/// Every field has an "unset" value under which its predicate passes
/// everything: empty string / empty set, `0.0` rating, [`DistanceBand::All`],
/// and `open_now == false`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub query: String,
    /// Category display labels. Disjunctive: any one match passes.
    pub categories: BTreeSet<String>,
    pub min_rating: f64,
    pub max_distance: DistanceBand,
    /// Price-symbol tokens such as `"$"` or `"$$$"`. Disjunctive.
    pub price_levels: BTreeSet<String>,
    pub open_now: bool,
    /// Conjunctive: every listed feature must be present.
    pub features: BTreeSet<String>,
}

impl FilterCriteria {
    /// `true` when no predicate restricts anything.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.query.trim().is_empty()
            && self.categories.is_empty()
            && self.min_rating <= 0.0
            && self.max_distance.ceiling_km().is_none()
            && self.price_levels.is_empty()
            && !self.open_now
            && self.features.is_empty()
    }
}
