//! Field-level parsing for violation rows.

use chrono::NaiveDateTime;

/// Parses a timestamp with the dataset's `chrono` format string.
///
/// Surrounding whitespace is ignored. Returns `None` for empty or malformed
/// values.
#[must_use]
pub fn parse_timestamp(s: &str, format: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(s, format).ok()
}

/// Parses lat/lng from string fields. Returns `None` if either is empty,
/// unparseable, non-finite, zero, or outside the valid degree range.
///
/// This is stricter than dropping blank cells alone: a row at latitude or
/// longitude `0` is rejected and never reaches a layer count.
#[must_use]
pub fn parse_lat_lng_str(lat: &str, lng: &str) -> Option<(f64, f64)> {
    let latitude = lat.trim().parse::<f64>().ok()?;
    let longitude = lng.trim().parse::<f64>().ok()?;
    if !latitude.is_finite() || !longitude.is_finite() {
        return None;
    }
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }
    Some((latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset_def::DEFAULT_TIMESTAMP_FORMAT;

    #[test]
    fn parses_twelve_hour_timestamp() {
        let dt = parse_timestamp("09/15/2024 07:42:10 PM", DEFAULT_TIMESTAMP_FORMAT).unwrap();
        assert_eq!(dt.to_string(), "2024-09-15 19:42:10");
    }

    #[test]
    fn parses_midnight_and_noon() {
        let midnight = parse_timestamp("01/01/2024 12:00:00 AM", DEFAULT_TIMESTAMP_FORMAT).unwrap();
        let noon = parse_timestamp("01/01/2024 12:00:00 PM", DEFAULT_TIMESTAMP_FORMAT).unwrap();
        assert_eq!(midnight.to_string(), "2024-01-01 00:00:00");
        assert_eq!(noon.to_string(), "2024-01-01 12:00:00");
    }

    #[test]
    fn rejects_malformed_timestamps() {
        assert!(parse_timestamp("", DEFAULT_TIMESTAMP_FORMAT).is_none());
        assert!(parse_timestamp("2024-09-15T19:42:10", DEFAULT_TIMESTAMP_FORMAT).is_none());
        assert!(parse_timestamp("13/40/2024 07:42:10 PM", DEFAULT_TIMESTAMP_FORMAT).is_none());
    }

    #[test]
    fn parses_lat_lng_strings() {
        let (la, lo) = parse_lat_lng_str(" 40.7580", "-73.9855 ").unwrap();
        assert!((la - 40.7580).abs() < f64::EPSILON);
        assert!((lo - -73.9855).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_missing_zero_and_out_of_range_coordinates() {
        assert!(parse_lat_lng_str("", "-73.9855").is_none());
        assert!(parse_lat_lng_str("0.0", "-73.9855").is_none());
        assert!(parse_lat_lng_str("40.7", "0").is_none());
        assert!(parse_lat_lng_str("91.0", "-73.9855").is_none());
        assert!(parse_lat_lng_str("40.7", "-181").is_none());
        assert!(parse_lat_lng_str("NaN", "-73.9855").is_none());
    }
}
