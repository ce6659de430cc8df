// src/kml.rs
//! KML document building and emission

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{KmlGenError, Result};
use crate::geometry::{CircleGeometry, LineGeometry};
use crate::gps::GeoPoint;

pub const DEFAULT_LINE_COLOR: &str = "ff0000ff";
pub const DEFAULT_LINE_WIDTH: u32 = 2;

/// Line styling: ARGB color as eight hex digits, width in `[1, 10]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSpec {
    color_argb: String,
    width: u32,
}

impl StyleSpec {
    pub fn new(color_argb: impl Into<String>, width: u32) -> Result<Self> {
        let color_argb = color_argb.into();
        if color_argb.len() != 8 || !color_argb.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(KmlGenError::Style(format!(
                "color must be 8 hex digits (ARGB), got {:?}",
                color_argb
            )));
        }
        if !(1..=10).contains(&width) {
            return Err(KmlGenError::Style(format!(
                "line width must be between 1 and 10, got {}",
                width
            )));
        }
        Ok(Self { color_argb, width })
    }

    pub fn color_argb(&self) -> &str {
        &self.color_argb
    }

    pub fn width(&self) -> u32 {
        self.width
    }
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            color_argb: DEFAULT_LINE_COLOR.to_string(),
            width: DEFAULT_LINE_WIDTH,
        }
    }
}

/// One placemark with a styled line string, ready to serialize.
#[derive(Debug, Clone)]
pub struct KmlDocument {
    style: StyleSpec,
    coordinates: Vec<GeoPoint>,
}

impl KmlDocument {
    /// Document for a directional ray: start, through, extended end.
    pub fn for_line(geometry: &LineGeometry, style: StyleSpec) -> Self {
        Self {
            style,
            coordinates: vec![geometry.start, geometry.through, geometry.end],
        }
    }

    /// Document for a circle: all 101 vertices in computed order.
    pub fn for_circle(geometry: &CircleGeometry, style: StyleSpec) -> Self {
        Self {
            style,
            coordinates: geometry.vertices.clone(),
        }
    }

    /// Serialize as pretty-printed KML 2.2.
    pub fn to_xml(&self) -> String {
        let coordinates = self
            .coordinates
            .iter()
            .map(|p| format!("{},{},0", p.longitude, p.latitude))
            .collect::<Vec<_>>()
            .join(" ");

        let mut kml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        kml.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n");
        kml.push_str("  <Placemark>\n");
        kml.push_str("    <Style>\n");
        kml.push_str("      <LineStyle>\n");
        kml.push_str(&format!("        <color>{}</color>\n", self.style.color_argb));
        kml.push_str(&format!("        <width>{}</width>\n", self.style.width));
        kml.push_str("      </LineStyle>\n");
        kml.push_str("    </Style>\n");
        kml.push_str("    <LineString>\n");
        kml.push_str(&format!("      <coordinates>{}</coordinates>\n", coordinates));
        kml.push_str("    </LineString>\n");
        kml.push_str("  </Placemark>\n");
        kml.push_str("</kml>\n");
        kml
    }

    /// Write the document to `path`.
    ///
    /// No overwrite guard here: callers resolve a fresh path first (see
    /// `naming::next_path`).
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.to_xml().as_bytes())?;
        Ok(())
    }
}
