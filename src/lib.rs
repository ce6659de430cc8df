// src/lib.rs
//! GPS KML Generator Library
//!
//! Acquires geographic fixes from NMEA-0183 receivers over serial links and
//! turns one or two fixes into a directional line or circle KML document.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod geometry;
pub mod gps;
pub mod kml;
pub mod naming;

// Re-export main types for convenience
pub use config::AppConfig;
pub use coordinator::FixCoordinator;
pub use error::{KmlGenError, Result};
pub use geometry::{CircleGeometry, LineGeometry};
pub use gps::{AcquireSpec, Fix, GeoPoint, NmeaReceiver, ReadPolicy, ReadScheduler};
pub use kml::{KmlDocument, StyleSpec};
