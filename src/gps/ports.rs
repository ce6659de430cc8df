// src/gps/ports.rs
//! Serial device enumeration

use crate::error::{KmlGenError, Result};

/// List the serial device names currently visible on the host.
///
/// Enumeration order comes straight from the OS and is not stable across
/// calls. An empty list is a valid answer, not an error.
pub fn enumerate_ports() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports()
        .map_err(|e| KmlGenError::Port(format!("Failed to list serial ports: {}", e)))?;

    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
