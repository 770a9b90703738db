//! Glue between filter state, the fetch controller and the filter engine.

use std::sync::Arc;
use std::time::Duration;

use lugar_core::{CategoryStyles, Coordinates, DisplayBusinessEntity, FilterCriteria};
use parking_lot::Mutex;

use crate::controller::{FetchController, FetchState};
use crate::filter::apply_filters;
use crate::filter_state::{CriteriaChange, FilterState};
use crate::source::BusinessSource;

struct VisibleCache {
    criteria: Arc<FilterCriteria>,
    revision: u64,
    entities: Arc<Vec<DisplayBusinessEntity>>,
}

/// One discovery screen: the user's criteria, the data fetched for them and
/// the filtered, ranked list derived from both.
pub struct DiscoverySession {
    filters: Mutex<FilterState>,
    controller: FetchController,
    styles: Arc<CategoryStyles>,
    visible: Mutex<Option<VisibleCache>>,
}

impl DiscoverySession {
    #[must_use]
    pub fn new(
        source: Arc<dyn BusinessSource>,
        styles: Arc<CategoryStyles>,
        debounce: Duration,
        origin: Option<Coordinates>,
    ) -> Self {
        let controller = FetchController::new(source, Arc::clone(&styles), debounce);
        controller.set_origin(origin);
        Self {
            filters: Mutex::new(FilterState::default()),
            controller,
            styles,
            visible: Mutex::new(None),
        }
    }

    /// Issues the initial fetch for the current criteria, without debounce.
    pub fn start(&self) {
        let filters = self.filters.lock();
        self.controller.trigger_now(filters.server_query(&self.styles));
    }

    /// Applies `edit` to the filter state and triggers a fetch when the
    /// server-side part of the criteria changed.
    pub fn update<F>(&self, edit: F) -> CriteriaChange
    where
        F: FnOnce(&mut FilterState) -> CriteriaChange,
    {
        // Triggering under the filters lock keeps cycle order equal to
        // mutation order across concurrent callers.
        let mut filters = self.filters.lock();
        let change = edit(&mut filters);
        if change == CriteriaChange::ServerQuery {
            self.controller.trigger(filters.server_query(&self.styles));
        }
        change
    }

    #[must_use]
    pub fn criteria(&self) -> Arc<FilterCriteria> {
        self.filters.lock().criteria()
    }

    #[must_use]
    pub fn controller(&self) -> &FetchController {
        &self.controller
    }

    #[must_use]
    pub fn fetch_state(&self) -> FetchState {
        self.controller.state()
    }

    /// The filtered, ranked entities for the current criteria and data.
    ///
    /// Recomputed only when the criteria pointer or the data revision moved.
    #[must_use]
    pub fn visible(&self) -> Arc<Vec<DisplayBusinessEntity>> {
        let criteria = self.criteria();
        let state = self.controller.state();

        let mut cache = self.visible.lock();
        if let Some(hit) = cache.as_ref().filter(|c| {
            Arc::ptr_eq(&c.criteria, &criteria) && c.revision == state.revision
        }) {
            return Arc::clone(&hit.entities);
        }

        let entities = Arc::new(apply_filters(&state.data, &criteria));
        tracing::debug!(
            revision = state.revision,
            total = state.data.len(),
            visible = entities.len(),
            "recomputed visible businesses"
        );
        *cache = Some(VisibleCache {
            criteria,
            revision: state.revision,
            entities: Arc::clone(&entities),
        });
        entities
    }
}
