//! Client-side filtering and ranking of display entities.
//!
//! All predicates are AND-ed. Each one passes everything while its criterion
//! sits at the unset value, and a malformed criterion (unparseable distance
//! band, unrecognizable price token) disables only its own predicate.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use lugar_core::{DisplayBusinessEntity, FilterCriteria};

/// Converts a price-symbol token to its tier: the tier is the symbol count.
///
/// A token is accepted only when it is one symbol repeated (`"$$"`, `"€€€"`).
/// Empty tokens, mixed symbols, letters, digits and inner whitespace yield `None`.
#[must_use]
pub fn price_tier_from_symbols(token: &str) -> Option<u8> {
    let token = token.trim();
    let mut chars = token.chars();
    let first = chars.next()?;
    if first.is_alphanumeric() || first.is_whitespace() {
        return None;
    }
    let mut count: u8 = 1;
    for c in chars {
        if c != first {
            return None;
        }
        count = count.checked_add(1)?;
    }
    Some(count)
}

/// Filters `entities` by `criteria` and ranks the survivors.
#[must_use]
pub fn apply_filters(
    entities: &[DisplayBusinessEntity],
    criteria: &FilterCriteria,
) -> Vec<DisplayBusinessEntity> {
    let predicate = CompiledCriteria::new(criteria);
    let matched: Vec<DisplayBusinessEntity> = entities
        .iter()
        .filter(|entity| predicate.matches(entity))
        .cloned()
        .collect();
    rank(matched)
}

/// `true` when `entity` passes every predicate of `criteria`.
#[must_use]
pub fn matches(entity: &DisplayBusinessEntity, criteria: &FilterCriteria) -> bool {
    CompiledCriteria::new(criteria).matches(entity)
}

/// Verified first, then rating descending. Stable: ties keep input order.
#[must_use]
pub fn rank(mut entities: Vec<DisplayBusinessEntity>) -> Vec<DisplayBusinessEntity> {
    entities.sort_by(compare_rank);
    entities
}

fn compare_rank(a: &DisplayBusinessEntity, b: &DisplayBusinessEntity) -> Ordering {
    b.is_verified
        .cmp(&a.is_verified)
        .then_with(|| b.rating.total_cmp(&a.rating))
}

/// Criteria with parsing done once per filter pass.
struct CompiledCriteria<'a> {
    query: Option<String>,
    categories: &'a BTreeSet<String>,
    min_rating: Option<f64>,
    max_distance_km: Option<f64>,
    price_tiers: Option<BTreeSet<u8>>,
    open_now: bool,
    features: &'a BTreeSet<String>,
}

impl<'a> CompiledCriteria<'a> {
    fn new(criteria: &'a FilterCriteria) -> Self {
        let query = Some(criteria.query.trim().to_lowercase()).filter(|q| !q.is_empty());

        let min_rating = Some(criteria.min_rating).filter(|r| r.is_finite() && *r > 0.0);

        let max_distance_km = criteria.max_distance.ceiling_km();
        if max_distance_km.is_none() && criteria.max_distance != lugar_core::DistanceBand::All {
            tracing::debug!(
                band = %criteria.max_distance,
                "ignoring unparseable distance band"
            );
        }

        let price_tiers = if criteria.price_levels.is_empty() {
            None
        } else {
            let tiers: BTreeSet<u8> = criteria
                .price_levels
                .iter()
                .filter_map(|token| {
                    let tier = price_tier_from_symbols(token);
                    if tier.is_none() {
                        tracing::debug!(token, "ignoring unrecognized price token");
                    }
                    tier
                })
                .collect();
            Some(tiers).filter(|t| !t.is_empty())
        };

        Self {
            query,
            categories: &criteria.categories,
            min_rating,
            max_distance_km,
            price_tiers,
            open_now: criteria.open_now,
            features: &criteria.features,
        }
    }

    fn matches(&self, entity: &DisplayBusinessEntity) -> bool {
        self.matches_query(entity)
            && (self.categories.is_empty() || self.categories.contains(&entity.category))
            && self.min_rating.is_none_or(|min| entity.rating >= min)
            && self
                .max_distance_km
                .is_none_or(|max| entity.distance_km <= max)
            && self
                .price_tiers
                .as_ref()
                .is_none_or(|tiers| tiers.contains(&entity.price_tier))
            && (!self.open_now || entity.is_open)
            && self.features.iter().all(|f| entity.features.contains(f))
    }

    /// Any one of name, category, or address containing the query passes.
    fn matches_query(&self, entity: &DisplayBusinessEntity) -> bool {
        let Some(query) = &self.query else {
            return true;
        };
        [&entity.name, &entity.category, &entity.address]
            .iter()
            .any(|field| field.to_lowercase().contains(query.as_str()))
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
