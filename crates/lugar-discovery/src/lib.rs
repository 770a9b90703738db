pub mod adapter;
pub mod controller;
pub mod debounce;
pub mod distance;
pub mod error;
pub mod filter;
pub mod filter_state;
pub mod geolocation;
pub mod session;
pub mod source;

pub use adapter::{to_display_entities, to_display_entity, valid_coordinates, AdapterContext};
pub use controller::{FetchController, FetchState};
pub use debounce::Debouncer;
pub use distance::{distance_between, format_distance, haversine_km, EARTH_RADIUS_KM};
pub use error::DiscoveryError;
pub use filter::{apply_filters, matches, price_tier_from_symbols, rank};
pub use filter_state::{CriteriaChange, FilterState};
pub use geolocation::{resolve_origin, FixedLocation, GeolocationError, LocationProvider};
pub use session::DiscoverySession;
pub use source::{BusinessSource, CycleToken, HttpBusinessSource, SourceQuery};
