//! Where distances are measured from.

use async_trait::async_trait;
use lugar_core::Coordinates;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("location permission denied")]
    Denied,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the user's current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Provider that always answers with the same position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// Asks `provider` for a position and falls back to `fallback` when it fails
/// or answers with coordinates outside the valid range.
pub async fn resolve_origin(
    provider: &dyn LocationProvider,
    fallback: Coordinates,
) -> Coordinates {
    match provider.current_position().await {
        Ok(position) if in_range(position) => {
            tracing::debug!(lat = position.lat, lng = position.lng, "using device position");
            position
        }
        Ok(position) => {
            tracing::warn!(
                lat = position.lat,
                lng = position.lng,
                "device position out of range, using city center"
            );
            fallback
        }
        Err(e) => {
            tracing::warn!(error = %e, "no device position, using city center");
            fallback
        }
    }
}

fn in_range(position: Coordinates) -> bool {
    (-90.0..=90.0).contains(&position.lat) && (-180.0..=180.0).contains(&position.lng)
}
