// src/gps/data.rs
//! Position data structures

use chrono::{DateTime, Utc};

/// A geographic position in decimal degrees.
///
/// No range clamping is performed here; callers validate longitude/latitude
/// bounds where it matters to them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }
}

/// A single decoded position, tagged with the device it came from.
#[derive(Debug, Clone)]
pub struct Fix {
    pub point: GeoPoint,
    pub source_id: String,
    pub acquired_at: DateTime<Utc>,
}

impl Fix {
    pub fn new(point: GeoPoint, source_id: impl Into<String>) -> Self {
        Self {
            point,
            source_id: source_id.into(),
            acquired_at: Utc::now(),
        }
    }
}
