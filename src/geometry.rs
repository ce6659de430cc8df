// src/geometry.rs
//! Planar geodesic approximations
//!
//! Everything here treats longitude/latitude degrees as locally Cartesian
//! (equirectangular approximation). That holds up at short range and low
//! latitude only; there is deliberately no great-circle correction.

use crate::error::{KmlGenError, Result};
use crate::gps::GeoPoint;

/// Earth radius in meters, used for line extension.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Earth radius in kilometers, used for circle polygons.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;
/// Segments used to approximate a circle (101 vertices, closed).
pub const CIRCLE_SEGMENTS: usize = 100;

/// A directional ray: from `start` through `through`, extended to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineGeometry {
    pub start: GeoPoint,
    pub through: GeoPoint,
    pub end: GeoPoint,
}

/// A closed circle approximation around `center`.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleGeometry {
    pub center: GeoPoint,
    pub radius_km: f64,
    pub vertices: Vec<GeoPoint>,
}

/// Angle from `p1` to `p2` relative to north, degrees in `[0, 360)`.
///
/// Planar `atan2(Δlon, Δlat)`, not a true geodetic bearing. Coincident
/// points yield `0.0`.
pub fn bearing_angle(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let delta_longitude = p2.longitude - p1.longitude;
    let delta_latitude = p2.latitude - p1.latitude;
    let angle = delta_longitude.atan2(delta_latitude).to_degrees();
    (angle + 360.0) % 360.0
}

/// Project the `p1 → p2` direction forward from `p2` by `length_m` meters.
pub fn extend_line(p1: GeoPoint, p2: GeoPoint, length_m: f64) -> Result<GeoPoint> {
    let mut direction_longitude = p2.longitude - p1.longitude;
    let mut direction_latitude = p2.latitude - p1.latitude;
    let magnitude = (direction_longitude.powi(2) + direction_latitude.powi(2)).sqrt();

    if magnitude == 0.0 {
        return Err(KmlGenError::Geometry(
            "the two points cannot be the same".to_string(),
        ));
    }

    direction_longitude /= magnitude;
    direction_latitude /= magnitude;

    let delta_latitude = (length_m / EARTH_RADIUS_M).to_degrees();
    let delta_longitude =
        (length_m / (EARTH_RADIUS_M * p2.latitude.to_radians().cos())).to_degrees();

    Ok(GeoPoint::new(
        p2.longitude + direction_longitude * delta_longitude,
        p2.latitude + direction_latitude * delta_latitude,
    ))
}

/// Build the full ray geometry: `p1`, `p2`, and the extended endpoint.
pub fn line_geometry(p1: GeoPoint, p2: GeoPoint, length_m: f64) -> Result<LineGeometry> {
    let end = extend_line(p1, p2, length_m)?;
    Ok(LineGeometry {
        start: p1,
        through: p2,
        end,
    })
}

/// Approximate a circle of `radius_km` around `center` with 101 vertices.
///
/// Accuracy degrades with radius and with distance from the equator.
pub fn circle_polygon(center: GeoPoint, radius_km: f64) -> Result<CircleGeometry> {
    if radius_km <= 0.0 {
        return Err(KmlGenError::Geometry(format!(
            "radius must be positive, got {} km",
            radius_km
        )));
    }

    let delta_latitude = (radius_km / EARTH_RADIUS_KM).to_degrees();
    let delta_longitude =
        (radius_km / (EARTH_RADIUS_KM * center.latitude.to_radians().cos())).to_degrees();

    let mut vertices = Vec::with_capacity(CIRCLE_SEGMENTS + 1);
    for i in 0..CIRCLE_SEGMENTS {
        let angle = 2.0 * std::f64::consts::PI * i as f64 / CIRCLE_SEGMENTS as f64;
        vertices.push(GeoPoint::new(
            center.longitude + delta_longitude * angle.cos(),
            center.latitude + delta_latitude * angle.sin(),
        ));
    }
    // Close the ring exactly rather than re-evaluating sin/cos at 2π.
    vertices.push(vertices[0]);

    Ok(CircleGeometry {
        center,
        radius_km,
        vertices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearing_zero_delta_is_north() {
        let p = GeoPoint::new(11.5167, 48.1173);
        assert_eq!(bearing_angle(p, p), 0.0);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert!((bearing_angle(origin, GeoPoint::new(0.0, 1.0)) - 0.0).abs() < 1e-9);
        assert!((bearing_angle(origin, GeoPoint::new(1.0, 0.0)) - 90.0).abs() < 1e-9);
        assert!((bearing_angle(origin, GeoPoint::new(0.0, -1.0)) - 180.0).abs() < 1e-9);
        assert!((bearing_angle(origin, GeoPoint::new(-1.0, 0.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_always_normalized() {
        let points = [
            GeoPoint::new(-179.0, -85.0),
            GeoPoint::new(179.0, 85.0),
            GeoPoint::new(-0.001, 0.001),
            GeoPoint::new(45.0, -45.0),
        ];
        for &a in &points {
            for &b in &points {
                let bearing = bearing_angle(a, b);
                assert!((0.0..360.0).contains(&bearing), "bearing {} out of range", bearing);
            }
        }
    }

    #[test]
    fn test_extend_line_rejects_coincident_points() {
        let p = GeoPoint::new(11.5167, 48.1173);
        for length in [0.0, 1.0, 50_000.0] {
            let err = extend_line(p, p, length).unwrap_err();
            assert!(matches!(err, KmlGenError::Geometry(_)));
        }
    }

    #[test]
    fn test_extend_line_due_north() {
        let p1 = GeoPoint::new(0.0, 0.0);
        let p2 = GeoPoint::new(0.0, 1.0);
        let end = extend_line(p1, p2, 111_000.0).unwrap();
        assert_eq!(end.longitude, 0.0);
        // ~111 km is roughly one degree of latitude.
        assert!((end.latitude - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_extend_line_direction_preserved() {
        let p1 = GeoPoint::new(10.0, 50.0);
        let p2 = GeoPoint::new(10.1, 50.1);
        let end = extend_line(p1, p2, 50_000.0).unwrap();
        assert!(end.longitude > p2.longitude);
        assert!(end.latitude > p2.latitude);
    }

    #[test]
    fn test_circle_polygon_closed_with_101_vertices() {
        let circle = circle_polygon(GeoPoint::new(11.5167, 48.1173), 5.0).unwrap();
        assert_eq!(circle.vertices.len(), 101);
        assert_eq!(circle.vertices[0], circle.vertices[100]);
    }

    #[test]
    fn test_circle_polygon_radius_spans() {
        let center = GeoPoint::new(0.0, 0.0);
        let circle = circle_polygon(center, 5.0).unwrap();
        // At the equator the latitude excursion is radius/R in degrees.
        let expected = (5.0_f64 / EARTH_RADIUS_KM).to_degrees();
        let max_lat = circle
            .vertices
            .iter()
            .map(|v| (v.latitude - center.latitude).abs())
            .fold(0.0_f64, f64::max);
        assert!((max_lat - expected).abs() < 1e-9);
    }

    #[test]
    fn test_circle_polygon_rejects_non_positive_radius() {
        let center = GeoPoint::new(11.5167, 48.1173);
        assert!(circle_polygon(center, 0.0).is_err());
        assert!(circle_polygon(center, -5.0).is_err());
    }
}
