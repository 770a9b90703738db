//! Great-circle distance between coordinates and its user-facing rendering.

use lugar_core::Coordinates;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers between two points given in decimal degrees.
///
/// Symmetric, and exactly `0.0` for identical points.
#[must_use]
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // rounding can push `a` a hair above 1 for antipodal points
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Distance between two [`Coordinates`] in kilometers.
#[must_use]
pub fn distance_between(a: Coordinates, b: Coordinates) -> f64 {
    haversine_km(a.lat, a.lng, b.lat, b.lng)
}

/// Display rounding: under 1 km the value is kept as-is, from 1 km up it is
/// rounded to one decimal.
#[must_use]
pub fn round_display_distance(km: f64) -> f64 {
    if km < 1.0 {
        km
    } else {
        (km * 10.0).round() / 10.0
    }
}

/// Renders a distance for humans: `"350 m"` below 1 km, `"2.4 km"` otherwise.
///
/// Sub-kilometer values are rounded to whole meters and capped at 999 so the
/// output never reads `"1000 m"`.
#[must_use]
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        let meters = (km.max(0.0) * 1000.0).round().min(999.0);
        format!("{meters:.0} m")
    } else {
        format!("{km:.1} km")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEVILLA: Coordinates = Coordinates {
        lat: 37.3891,
        lng: -5.9845,
    };
    const MADRID: Coordinates = Coordinates {
        lat: 40.4168,
        lng: -3.7038,
    };

    #[test]
    fn sevilla_to_madrid_is_about_390_km() {
        let d = distance_between(SEVILLA, MADRID);
        assert!((d - 390.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (SEVILLA, MADRID),
            (Coordinates::new(0.5, 179.9), Coordinates::new(-0.5, -179.9)),
            (Coordinates::new(89.0, 10.0), Coordinates::new(-45.0, -120.0)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance_between(a, b), distance_between(b, a));
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance_between(SEVILLA, SEVILLA), 0.0);
        assert_eq!(haversine_km(-33.9, 151.2, -33.9, 151.2), 0.0);
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let d = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-3);
    }

    #[test]
    fn round_display_distance_keeps_sub_km_precision() {
        assert_eq!(round_display_distance(0.4567), 0.4567);
        assert_eq!(round_display_distance(1.04), 1.0);
        assert_eq!(round_display_distance(2.46), 2.5);
    }

    #[test]
    fn format_distance_uses_meters_below_one_km() {
        assert_eq!(format_distance(0.7), "700 m");
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(0.9996), "999 m");
    }

    #[test]
    fn format_distance_uses_one_decimal_km_otherwise() {
        assert_eq!(format_distance(1.0), "1.0 km");
        assert_eq!(format_distance(12.345), "12.3 km");
    }

    #[test]
    fn format_distance_is_monotonic() {
        let samples = [0.0, 0.05, 0.3, 0.7, 0.9994, 1.0, 1.26, 3.0, 48.2];
        let rendered: Vec<f64> = samples
            .iter()
            .map(|km| {
                let s = format_distance(*km);
                if let Some(m) = s.strip_suffix(" m") {
                    m.parse::<f64>().unwrap() / 1000.0
                } else {
                    s.trim_end_matches(" km").parse::<f64>().unwrap()
                }
            })
            .collect();
        assert!(rendered.windows(2).all(|w| w[0] <= w[1]), "{rendered:?}");
    }
}
