//! Owner of the current [`FilterCriteria`].
//!
//! Every mutation builds a fresh criteria value and swaps the shared pointer,
//! so consumers can gate recomputation on `Arc::ptr_eq` or on `==`.

use std::collections::BTreeSet;
use std::sync::Arc;

use lugar_core::{CategoryStyles, DistanceBand, FilterCriteria};

use crate::source::SourceQuery;

/// What a mutation changed, from the point of view of the fetch layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriteriaChange {
    Unchanged,
    /// Only client-side predicates changed; re-filter the current data.
    ClientOnly,
    /// The search text or category selection changed; a new fetch is needed.
    ServerQuery,
}

impl CriteriaChange {
    fn between(old: &FilterCriteria, new: &FilterCriteria) -> Self {
        if old.query != new.query || old.categories != new.categories {
            CriteriaChange::ServerQuery
        } else if old != new {
            CriteriaChange::ClientOnly
        } else {
            CriteriaChange::Unchanged
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterState {
    criteria: Arc<FilterCriteria>,
}

impl FilterState {
    #[must_use]
    pub fn new(initial: FilterCriteria) -> Self {
        Self {
            criteria: Arc::new(initial),
        }
    }

    /// The current criteria. The pointer changes on every mutation.
    #[must_use]
    pub fn criteria(&self) -> Arc<FilterCriteria> {
        Arc::clone(&self.criteria)
    }

    fn update(&mut self, edit: impl FnOnce(&mut FilterCriteria)) -> CriteriaChange {
        let mut next = FilterCriteria::clone(&self.criteria);
        edit(&mut next);
        let change = CriteriaChange::between(&self.criteria, &next);
        self.criteria = Arc::new(next);
        change
    }

    pub fn set_query(&mut self, query: impl Into<String>) -> CriteriaChange {
        let query = query.into();
        self.update(|c| c.query = query)
    }

    /// Adds the category if absent, removes it if present.
    pub fn toggle_category(&mut self, label: &str) -> CriteriaChange {
        self.update(|c| toggle(&mut c.categories, label))
    }

    pub fn set_categories<I, S>(&mut self, labels: I) -> CriteriaChange
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
        self.update(|c| c.categories = labels)
    }

    /// Negative or non-finite values reset the threshold to "no restriction".
    pub fn set_min_rating(&mut self, rating: f64) -> CriteriaChange {
        let rating = if rating.is_finite() {
            rating.clamp(0.0, 5.0)
        } else {
            0.0
        };
        self.update(|c| c.min_rating = rating)
    }

    pub fn set_max_distance(&mut self, band: DistanceBand) -> CriteriaChange {
        self.update(|c| c.max_distance = band)
    }

    pub fn toggle_price_level(&mut self, token: &str) -> CriteriaChange {
        self.update(|c| toggle(&mut c.price_levels, token))
    }

    pub fn set_open_now(&mut self, open_now: bool) -> CriteriaChange {
        self.update(|c| c.open_now = open_now)
    }

    pub fn toggle_feature(&mut self, feature: &str) -> CriteriaChange {
        self.update(|c| toggle(&mut c.features, feature))
    }

    /// Replaces the whole criteria value.
    pub fn replace(&mut self, criteria: FilterCriteria) -> CriteriaChange {
        self.update(|c| *c = criteria)
    }

    pub fn reset(&mut self) -> CriteriaChange {
        self.replace(FilterCriteria::default())
    }

    /// Projects the criteria onto what the backend can filter: the search
    /// text, and the category slug when exactly one category is selected.
    #[must_use]
    pub fn server_query(&self, styles: &CategoryStyles) -> SourceQuery {
        let search = Some(self.criteria.query.trim())
            .filter(|q| !q.is_empty())
            .map(str::to_owned);

        let category = match self.criteria.categories.len() {
            1 => self.criteria.categories.iter().next().map(|label| {
                styles.slug_for_label(label).map_or_else(
                    || CategoryStyles::normalize_slug(label),
                    str::to_owned,
                )
            }),
            _ => None,
        };

        SourceQuery { search, category }
    }
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    if !set.remove(value) {
        set.insert(value.to_owned());
    }
}
