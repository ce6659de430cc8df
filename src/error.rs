// src/error.rs
//! Error types for the KML generator

use std::fmt;

pub type Result<T> = std::result::Result<T, KmlGenError>;

#[derive(Debug)]
pub enum KmlGenError {
    Io(std::io::Error),
    Serial(tokio_serial::Error),
    Json(serde_json::Error),
    /// Device open/read failure at the transport layer.
    Port(String),
    /// No valid GGA/RMC sentence recognized within the read timeout.
    Timeout { device: String },
    /// Degenerate geometry input (coincident points, non-positive radius).
    Geometry(String),
    /// Invalid line style (color not 8 hex digits, width out of range).
    Style(String),
    Other(String),
}

impl fmt::Display for KmlGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KmlGenError::Io(e) => write!(f, "IO error: {}", e),
            KmlGenError::Serial(e) => write!(f, "Serial error: {}", e),
            KmlGenError::Json(e) => write!(f, "JSON error: {}", e),
            KmlGenError::Port(msg) => write!(f, "Port error: {}", msg),
            KmlGenError::Timeout { device } => {
                write!(f, "Timed out waiting for a fix on {}", device)
            }
            KmlGenError::Geometry(msg) => write!(f, "Geometry error: {}", msg),
            KmlGenError::Style(msg) => write!(f, "Style error: {}", msg),
            KmlGenError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for KmlGenError {}

impl From<std::io::Error> for KmlGenError {
    fn from(error: std::io::Error) -> Self {
        KmlGenError::Io(error)
    }
}

impl From<tokio_serial::Error> for KmlGenError {
    fn from(error: tokio_serial::Error) -> Self {
        KmlGenError::Serial(error)
    }
}

impl From<serde_json::Error> for KmlGenError {
    fn from(error: serde_json::Error) -> Self {
        KmlGenError::Json(error)
    }
}

impl From<anyhow::Error> for KmlGenError {
    fn from(error: anyhow::Error) -> Self {
        KmlGenError::Other(error.to_string())
    }
}
