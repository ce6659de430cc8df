// src/gps/nmea.rs
//! NMEA sentence decoding
//!
//! Only the position-carrying subset is consumed: `$GNGGA`/`$GPGGA` and
//! `$GNRMC`/`$GPRMC`. Everything else on the wire is ignored.

use super::data::GeoPoint;

/// Decode a single NMEA sentence into a position.
///
/// Returns `None` for unrecognized sentence types and for recognized
/// sentences that fail field-count or numeric validation; the caller keeps
/// reading in either case.
pub fn parse_fix(line: &str) -> Option<GeoPoint> {
    if line.starts_with("$GPGGA") || line.starts_with("$GNGGA") {
        let parts: Vec<&str> = line.split(',').collect();
        parse_gga(&parts)
    } else if line.starts_with("$GPRMC") || line.starts_with("$GNRMC") {
        let parts: Vec<&str> = line.split(',').collect();
        parse_rmc(&parts)
    } else {
        None
    }
}

/// GGA: latitude at field 2 (hemisphere 3), longitude at field 4 (hemisphere 5).
fn parse_gga(parts: &[&str]) -> Option<GeoPoint> {
    if parts.len() <= 5 || parts[2].is_empty() || parts[4].is_empty() {
        return None;
    }
    let latitude = parse_coordinate(parts[2], parts[3], "S")?;
    let longitude = parse_coordinate(parts[4], parts[5], "W")?;
    Some(GeoPoint::new(longitude, latitude))
}

/// RMC: latitude at field 3 (hemisphere 4), longitude at field 5 (hemisphere 6).
fn parse_rmc(parts: &[&str]) -> Option<GeoPoint> {
    if parts.len() <= 6 || parts[3].is_empty() || parts[5].is_empty() {
        return None;
    }
    let latitude = parse_coordinate(parts[3], parts[4], "S")?;
    let longitude = parse_coordinate(parts[5], parts[6], "W")?;
    Some(GeoPoint::new(longitude, latitude))
}

/// Convert an NMEA `ddmm.mmmm` / `dddmm.mmmm` field to decimal degrees,
/// negated when the hemisphere matches `negative_hemisphere`.
fn parse_coordinate(field: &str, hemisphere: &str, negative_hemisphere: &str) -> Option<f64> {
    let raw = field.parse::<f64>().ok()?;
    let degrees = (raw / 100.0).trunc();
    let minutes = raw - degrees * 100.0;
    let mut decimal = degrees + minutes / 60.0;
    if hemisphere == negative_hemisphere {
        decimal = -decimal;
    }
    Some(decimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gga_parsing() {
        let gga = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
        let point = parse_fix(gga).expect("valid GGA sentence");
        assert!((point.latitude - (48.0 + 7.038 / 60.0)).abs() < 1e-9);
        assert!((point.longitude - (11.0 + 31.0 / 60.0)).abs() < 1e-9);
        assert!(point.latitude > 0.0);
        assert!(point.longitude > 0.0);
    }

    #[test]
    fn test_rmc_parsing() {
        let rmc = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
        let point = parse_fix(rmc).expect("valid RMC sentence");
        assert!((point.latitude - 48.1173).abs() < 1e-3);
        assert!((point.longitude - 11.5167).abs() < 1e-3);
    }

    #[test]
    fn test_southern_western_hemispheres() {
        let rmc = "$GNRMC,081836,A,3751.650,S,14507.360,W,000.0,360.0,130998,011.3,E*62";
        let point = parse_fix(rmc).expect("valid RMC sentence");
        assert!(point.latitude < 0.0);
        assert!(point.longitude < 0.0);
        assert!((point.latitude + (37.0 + 51.650 / 60.0)).abs() < 1e-9);
        assert!((point.longitude + (145.0 + 7.360 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_coordinate_fields_skipped() {
        assert!(parse_fix("$GPGGA,,,,,,,,,,,,,,*00").is_none());
        assert!(parse_fix("$GPRMC,,V,,,,,,,,,,N*53").is_none());
    }

    #[test]
    fn test_short_sentence_skipped() {
        assert!(parse_fix("$GPGGA,123519,4807.038").is_none());
    }

    #[test]
    fn test_non_numeric_coordinate_skipped() {
        assert!(parse_fix("$GPGGA,123519,abcd.efg,N,01131.000,E,1,08").is_none());
    }

    #[test]
    fn test_unrecognized_sentence_ignored() {
        assert!(parse_fix("$GPGSV,3,1,12,01,40,083,46*75").is_none());
        assert!(parse_fix("not nmea at all").is_none());
    }
}
