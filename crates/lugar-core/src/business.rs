//! Business record shapes: the tolerant wire form returned by the backend and
//! the normalized entity consumed by lists, carousels and map markers.

use std::collections::BTreeSet;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::categories::CategoryStyle;

/// Cover image sentinel used when the backend sends no image.
pub const PLACEHOLDER_IMAGE: &str = "/static/img/business-placeholder.jpg";

/// Locality shown when a record carries no street address.
pub const DEFAULT_ADDRESS: &str = "Sevilla, España";

/// A numeric field that may arrive as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    /// Coerces to `f64`. Returns `None` for unparseable or non-finite values.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            NumberOrText::Number(n) => *n,
            NumberOrText::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// Backend primary key. Some endpoints serialize it as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{n}"),
            RecordId::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Category as sent by the backend: either `{ "name", "slug" }` or a bare label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCategory {
    Detailed {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        slug: Option<String>,
    },
    Name(String),
}

impl RawCategory {
    /// The slug used for style lookup. A bare label doubles as its own slug.
    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        match self {
            RawCategory::Detailed { slug, name } => slug.as_deref().or(name.as_deref()),
            RawCategory::Name(name) => Some(name.as_str()),
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            RawCategory::Detailed { name, .. } => name.as_deref(),
            RawCategory::Name(name) => Some(name.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawLocation {
    #[serde(default, alias = "latitude")]
    pub lat: Option<NumberOrText>,
    #[serde(default, alias = "longitude", alias = "lon")]
    pub lng: Option<NumberOrText>,
}

/// A business as returned by the backend API.
///
/// Only `id` and a present `name` key are required. Every other field is
/// optional, numeric fields accept both numbers and numeric strings, and a
/// `null` or wrongly typed value degrades to the field's default instead of
/// rejecting the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBusinessRecord {
    pub id: RecordId,
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<RawCategory>,
    #[serde(default, alias = "average_rating", deserialize_with = "lenient")]
    pub rating: Option<NumberOrText>,
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub website: Option<String>,
    #[serde(
        default,
        alias = "image",
        alias = "cover_image_url",
        deserialize_with = "lenient"
    )]
    pub cover_image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<RawLocation>,
    #[serde(default, alias = "verified", deserialize_with = "lenient")]
    pub is_verified: bool,
    /// Integer tier, numeric string, or price-symbol string such as `"$$"`.
    #[serde(default, alias = "price_range", deserialize_with = "lenient")]
    pub price_level: Option<NumberOrText>,
    #[serde(default, alias = "open_now", deserialize_with = "lenient")]
    pub is_open: bool,
    #[serde(default, alias = "tags", deserialize_with = "lenient")]
    pub features: Vec<String>,
    #[serde(default, alias = "reviews_count", deserialize_with = "lenient")]
    pub review_count: Option<NumberOrText>,
    /// Server-computed distance in kilometers, when the query carried a position.
    #[serde(default, deserialize_with = "lenient")]
    pub distance: Option<NumberOrText>,
}

/// Deserializes `T`, falling back to `T::default()` when the value is `null`
/// or has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient<T> {
        Value(T),
        Other(IgnoredAny),
    }

    Ok(match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Value(value) => value,
        Lenient::Other(_) => T::default(),
    })
}

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// The normalized, map/list-ready representation of a business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayBusinessEntity {
    pub id: String,
    pub name: String,
    /// Display label, e.g. `"Restaurantes"`.
    pub category: String,
    /// Normalized slug the style was resolved from.
    pub category_slug: String,
    pub style: CategoryStyle,
    /// In `[0, 5]`.
    pub rating: f64,
    /// Kilometers. Values under 1 are unrounded, values from 1 up carry one decimal.
    pub distance_km: f64,
    pub coordinates: Coordinates,
    pub cover_image: String,
    pub is_open: bool,
    /// 1..=3
    pub price_tier: u8,
    pub is_verified: bool,
    pub features: BTreeSet<String>,
    pub address: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub review_count: u32,
}

impl DisplayBusinessEntity {
    #[must_use]
    pub fn has_cover_image(&self) -> bool {
        self.cover_image != PLACEHOLDER_IMAGE
    }
}
