pub mod app_config;
pub mod business;
pub mod categories;
pub mod config;
pub mod criteria;
pub mod error;

pub use app_config::{AppConfig, Environment};
pub use business::{
    Coordinates, DisplayBusinessEntity, NumberOrText, RawBusinessRecord, RawCategory, RawLocation,
    RecordId, DEFAULT_ADDRESS, PLACEHOLDER_IMAGE,
};
pub use categories::{load_category_styles, CategoryStyle, CategoryStyles, DEFAULT_CATEGORY_SLUG};
pub use config::{load_app_config, load_app_config_from_env};
pub use criteria::{DistanceBand, FilterCriteria};
pub use error::ConfigError;
