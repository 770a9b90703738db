//! Upstream business data sources.

mod http;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use lugar_core::RawBusinessRecord;

use crate::error::DiscoveryError;

pub use http::HttpBusinessSource;

/// The server-side subset of the filter criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceQuery {
    /// Free-text search.
    pub search: Option<String>,
    /// Category slug. Only sent when exactly one category is selected.
    pub category: Option<String>,
}

/// Identifies one fetch cycle.
///
/// A token is current until a newer cycle is issued by the same controller.
/// Sources may poll [`CycleToken::is_cancelled`] between steps, but do not
/// have to: the controller drops a superseded cycle's future and ignores any
/// result it manages to produce.
#[derive(Debug, Clone)]
pub struct CycleToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl CycleToken {
    pub(crate) fn new(generation: u64, current: Arc<AtomicU64>) -> Self {
        Self {
            generation,
            current,
        }
    }

    /// A token that is never cancelled, for one-shot callers.
    #[must_use]
    pub fn detached() -> Self {
        Self::new(0, Arc::new(AtomicU64::new(0)))
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.current.load(Ordering::SeqCst) != self.generation
    }
}

/// A cancellable request/response source of raw business records.
///
/// Implementations must tolerate their future being dropped at any await
/// point. A cancelled token never turns a response into an empty success:
/// sources either return what they fetched or stop early with an error.
/// The returned list carries no ordering guarantee.
#[async_trait]
pub trait BusinessSource: Send + Sync {
    async fn fetch(
        &self,
        query: &SourceQuery,
        token: &CycleToken,
    ) -> Result<Vec<RawBusinessRecord>, DiscoveryError>;
}
