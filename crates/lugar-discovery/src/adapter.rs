//! Normalization from backend [`RawBusinessRecord`]s to map-ready
//! [`DisplayBusinessEntity`] values.
//!
//! Records without usable coordinates are dropped here and never reach the
//! filter engine. Every other data-shape problem degrades to a default.

use std::collections::BTreeSet;

use lugar_core::{
    CategoryStyles, Coordinates, DisplayBusinessEntity, NumberOrText, RawBusinessRecord,
    RawCategory, RawLocation, DEFAULT_ADDRESS, DEFAULT_CATEGORY_SLUG, PLACEHOLDER_IMAGE,
};

use crate::distance::{distance_between, round_display_distance};
use crate::filter::price_tier_from_symbols;

/// Lookup tables and the distance origin shared by one adaptation pass.
#[derive(Debug, Clone, Copy)]
pub struct AdapterContext<'a> {
    pub styles: &'a CategoryStyles,
    /// The user's position. When absent, the server-computed distance is used.
    pub origin: Option<Coordinates>,
}

impl<'a> AdapterContext<'a> {
    #[must_use]
    pub fn new(styles: &'a CategoryStyles, origin: Option<Coordinates>) -> Self {
        Self { styles, origin }
    }
}

/// Extracts coordinates, treating missing, unparseable, non-finite, or exactly
/// zero latitude/longitude as unset.
#[must_use]
pub fn valid_coordinates(location: Option<&RawLocation>) -> Option<Coordinates> {
    let location = location?;
    let lat = location.lat.as_ref().and_then(NumberOrText::as_f64)?;
    let lng = location.lng.as_ref().and_then(NumberOrText::as_f64)?;
    if lat == 0.0 || lng == 0.0 {
        return None;
    }
    Some(Coordinates::new(lat, lng))
}

/// Converts one record. Returns `None` when the record has no usable coordinates.
#[must_use]
pub fn to_display_entity(
    raw: &RawBusinessRecord,
    ctx: &AdapterContext<'_>,
) -> Option<DisplayBusinessEntity> {
    let coordinates = valid_coordinates(raw.location.as_ref())?;

    let (category_slug, style) = ctx
        .styles
        .resolve(raw.category.as_ref().and_then(|c| c.slug()));
    let category = category_label(raw.category.as_ref(), &category_slug, &style.label);

    let rating = raw
        .rating
        .as_ref()
        .and_then(NumberOrText::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, 5.0);

    let distance_km = match ctx.origin {
        Some(origin) => distance_between(origin, coordinates),
        None => raw
            .distance
            .as_ref()
            .and_then(NumberOrText::as_f64)
            .filter(|km| *km >= 0.0)
            .unwrap_or(0.0),
    };

    let features: BTreeSet<String> = raw
        .features
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(str::to_owned)
        .collect();

    Some(DisplayBusinessEntity {
        id: raw.id.to_string(),
        name: raw.name.trim().to_owned(),
        category,
        category_slug,
        style: style.clone(),
        rating,
        distance_km: round_display_distance(distance_km),
        coordinates,
        cover_image: non_empty(raw.cover_image.as_deref())
            .unwrap_or(PLACEHOLDER_IMAGE)
            .to_owned(),
        is_open: raw.is_open,
        price_tier: price_tier(raw.price_level.as_ref()),
        is_verified: raw.is_verified,
        features,
        address: non_empty(raw.address.as_deref())
            .unwrap_or(DEFAULT_ADDRESS)
            .to_owned(),
        phone: non_empty(raw.phone.as_deref()).map(str::to_owned),
        website: non_empty(raw.website.as_deref()).map(str::to_owned),
        review_count: review_count(raw.review_count.as_ref()),
    })
}

/// Converts a batch, dropping records without usable coordinates.
///
/// Surviving entities keep their input order.
#[must_use]
pub fn to_display_entities(
    raws: &[RawBusinessRecord],
    ctx: &AdapterContext<'_>,
) -> Vec<DisplayBusinessEntity> {
    let entities: Vec<DisplayBusinessEntity> = raws
        .iter()
        .filter_map(|raw| to_display_entity(raw, ctx))
        .collect();

    let dropped = raws.len() - entities.len();
    if dropped > 0 {
        tracing::debug!(
            total = raws.len(),
            dropped,
            "dropped business records without usable coordinates"
        );
    }
    entities
}

/// The label shown for a record's category.
///
/// A server-provided display name wins unless it only restates a slug the
/// style table knows, in which case the table label is used so label-based
/// filters and the server query see one canonical spelling.
fn category_label(raw: Option<&RawCategory>, slug: &str, table_label: &str) -> String {
    let known = slug != DEFAULT_CATEGORY_SLUG;
    let name = non_empty(raw.and_then(RawCategory::name));
    match (raw, name) {
        (Some(RawCategory::Detailed { .. }), Some(name))
            if !known || CategoryStyles::normalize_slug(name) != slug =>
        {
            name.to_owned()
        }
        (Some(RawCategory::Name(_)), Some(name)) if !known => name.to_owned(),
        _ => table_label.to_owned(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Integer tiers are clamped into 1..=3; symbol strings map by length.
fn price_tier(level: Option<&NumberOrText>) -> u8 {
    let tier = match level {
        Some(NumberOrText::Text(text)) if text.trim().parse::<f64>().is_err() => {
            price_tier_from_symbols(text).map(f64::from)
        }
        Some(other) => other.as_f64().map(f64::round),
        None => None,
    };
    // clamped into 1..=3 before the cast
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    tier.map_or(1, |t| t.clamp(1.0, 3.0) as u8)
}

fn review_count(count: Option<&NumberOrText>) -> u32 {
    // clamped into u32 range before the cast
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    count
        .and_then(NumberOrText::as_f64)
        .map_or(0, |n| n.clamp(0.0, f64::from(u32::MAX)) as u32)
}

#[cfg(test)]
#[path = "adapter_test.rs"]
mod tests;
