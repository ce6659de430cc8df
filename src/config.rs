// src/config.rs
//! Persisted defaults for acquisition and output

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{KmlGenError, Result};
use crate::gps::receiver::{DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};
use crate::kml::{DEFAULT_LINE_COLOR, DEFAULT_LINE_WIDTH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory KML files are written into; `None` means the caller must
    /// supply one per request.
    pub output_dir: Option<PathBuf>,
    pub baud_rate: u32,
    pub read_timeout_secs: u64,
    /// Default forward extension for directional lines, meters.
    pub line_length_m: f64,
    /// Default circle radius, kilometers.
    pub radius_km: f64,
    pub line_color: String,
    pub line_width: u32,
    /// When true, all protocol reads are serialized across devices.
    pub serialize_reads: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_secs: DEFAULT_READ_TIMEOUT.as_secs(),
            line_length_m: 50_000.0,
            radius_km: 5.0,
            line_color: DEFAULT_LINE_COLOR.to_string(),
            line_width: DEFAULT_LINE_WIDTH,
            serialize_reads: true,
        }
    }
}

impl AppConfig {
    /// Load configuration, falling back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .map_err(|e| KmlGenError::Other(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| KmlGenError::Other(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration, creating the config directory if needed.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| KmlGenError::Other(format!("Failed to create config directory: {}", e)))?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        std::fs::write(&config_path, contents)
            .map_err(|e| KmlGenError::Other(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| KmlGenError::Other("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("gps-kml-generator")
            .join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.read_timeout_secs, 5);
        assert_eq!(config.line_length_m, 50_000.0);
        assert_eq!(config.radius_km, 5.0);
        assert_eq!(config.line_color, "ff0000ff");
        assert_eq!(config.line_width, 2);
        assert!(config.serialize_reads);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let mut config = AppConfig::default();
        config.output_dir = Some(PathBuf::from("/tmp/kml"));
        config.baud_rate = 115_200;

        let json = serde_json::to_string(&config).unwrap();
        let restored: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.baud_rate, 115_200);
        assert_eq!(restored.output_dir, Some(PathBuf::from("/tmp/kml")));
    }
}
