// src/gps/mod.rs
//! GPS acquisition: device enumeration, NMEA decoding, fix receivers

pub mod data;
pub mod nmea;
pub mod ports;
pub mod receiver;

pub use data::{Fix, GeoPoint};
pub use receiver::{AcquireSpec, NmeaReceiver, ReadPolicy, ReadScheduler, ReceiverState};
