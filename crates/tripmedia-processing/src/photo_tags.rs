//! Best-effort decoding of photo capture time and GPS tags.
//!
//! Missing or malformed tags never fail an upload; they just leave the
//! corresponding field unset.

use chrono::{DateTime, NaiveDate, Utc};
use exif::{Exif, Field, In, Reader, Tag, Value};
use std::io::Cursor;
use tripmedia_core::models::GeoPoint;

/// Tags read from a photo
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoTags {
    pub captured_at: Option<DateTime<Utc>>,
    pub gps: Option<GeoPoint>,
}

/// Decode tags from an image container. Returns `None` when the bytes carry no
/// readable EXIF block at all.
pub fn decode_photo_tags(data: &[u8]) -> Option<PhotoTags> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif) => exif,
        Err(e) => {
            tracing::debug!(error = %e, "No readable EXIF data");
            return None;
        }
    };

    Some(PhotoTags {
        captured_at: capture_time(&exif),
        gps: gps_point(&exif),
    })
}

/// DateTimeOriginal, falling back to DateTime. Treated as UTC.
fn capture_time(exif: &Exif) -> Option<DateTime<Utc>> {
    [Tag::DateTimeOriginal, Tag::DateTime]
        .into_iter()
        .filter_map(|tag| exif.get_field(tag, In::PRIMARY))
        .find_map(parse_datetime)
}

fn parse_datetime(field: &Field) -> Option<DateTime<Utc>> {
    let Value::Ascii(ref parts) = field.value else {
        return None;
    };
    let raw = parts.first()?;
    let dt = exif::DateTime::from_ascii(raw).ok()?;

    let naive = NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())?
        .and_hms_opt(dt.hour.into(), dt.minute.into(), dt.second.into())?;
    Some(naive.and_utc())
}

/// Degrees + minutes/60 + seconds/3600
fn dms(field: &Field) -> Option<f64> {
    match field.value {
        Value::Rational(ref v) if v.len() >= 3 => {
            let parts: Vec<f64> = v.iter().take(3).map(|r| r.to_f64()).collect();
            if parts.iter().any(|p| !p.is_finite()) {
                return None;
            }
            Some(parts[0] + parts[1] / 60.0 + parts[2] / 3600.0)
        }
        _ => None,
    }
}

/// First letter of an ASCII reference tag such as GPSLatitudeRef
fn reference(exif: &Exif, tag: Tag) -> Option<u8> {
    match exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(ref parts) => parts.first()?.first().copied(),
        _ => None,
    }
}

fn altitude(exif: &Exif) -> f64 {
    let Some(field) = exif.get_field(Tag::GPSAltitude, In::PRIMARY) else {
        return 0.0;
    };
    let meters = match field.value {
        Value::Rational(ref v) if !v.is_empty() && v[0].denom != 0 => v[0].to_f64(),
        _ => return 0.0,
    };
    let below_sea_level = matches!(
        exif.get_field(Tag::GPSAltitudeRef, In::PRIMARY).map(|f| &f.value),
        Some(Value::Byte(ref b)) if b.first() == Some(&1)
    );
    if below_sea_level {
        -meters
    } else {
        meters
    }
}

fn gps_point(exif: &Exif) -> Option<GeoPoint> {
    let mut latitude = dms(exif.get_field(Tag::GPSLatitude, In::PRIMARY)?)?;
    let mut longitude = dms(exif.get_field(Tag::GPSLongitude, In::PRIMARY)?)?;

    if matches!(reference(exif, Tag::GPSLatitudeRef), Some(b'S' | b's')) {
        latitude = -latitude;
    }
    if matches!(reference(exif, Tag::GPSLongitudeRef), Some(b'W' | b'w')) {
        longitude = -longitude;
    }

    Some(GeoPoint::new(latitude, longitude, altitude(exif)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{ascii, field, jpeg_with_fields, madrid_fields, rational};

    #[test]
    fn test_decodes_gps_and_capture_time() {
        let jpeg = jpeg_with_fields(&madrid_fields());
        let tags = decode_photo_tags(&jpeg).expect("exif present");

        let gps = tags.gps.expect("gps present");
        assert!((gps.latitude - 40.4168).abs() < 1e-6);
        assert!((gps.longitude - -3.7038).abs() < 1e-6);
        assert_eq!(gps.altitude, 650.0);

        let expected = NaiveDate::from_ymd_opt(2023, 7, 14)
            .unwrap()
            .and_hms_opt(18, 30, 5)
            .unwrap()
            .and_utc();
        assert_eq!(tags.captured_at, Some(expected));
    }

    #[test]
    fn test_falls_back_to_datetime_tag() {
        let jpeg = jpeg_with_fields(&[field(Tag::DateTime, ascii("2021:01:02 03:04:05"))]);
        let tags = decode_photo_tags(&jpeg).expect("exif present");
        assert!(tags.gps.is_none());
        assert_eq!(
            tags.captured_at.map(|t| t.to_rfc3339()),
            Some("2021-01-02T03:04:05+00:00".to_string())
        );
    }

    #[test]
    fn test_southern_and_below_sea_level() {
        let jpeg = jpeg_with_fields(&[
            field(
                Tag::GPSLatitude,
                Value::Rational(vec![rational(33, 1), rational(52, 1), rational(0, 1)]),
            ),
            field(Tag::GPSLatitudeRef, ascii("S")),
            field(
                Tag::GPSLongitude,
                Value::Rational(vec![rational(151, 1), rational(12, 1), rational(0, 1)]),
            ),
            field(Tag::GPSLongitudeRef, ascii("E")),
            field(Tag::GPSAltitude, Value::Rational(vec![rational(5, 1)])),
            field(Tag::GPSAltitudeRef, Value::Byte(vec![1])),
        ]);
        let gps = decode_photo_tags(&jpeg).and_then(|t| t.gps).expect("gps");
        assert!(gps.latitude < 0.0);
        assert!(gps.longitude > 0.0);
        assert_eq!(gps.altitude, -5.0);
    }

    #[test]
    fn test_missing_exif_is_none() {
        assert!(decode_photo_tags(b"\xFF\xD8\xFF\xD9").is_none());
        assert!(decode_photo_tags(b"not an image").is_none());
    }

    #[test]
    fn test_malformed_date_is_ignored() {
        let jpeg = jpeg_with_fields(&[field(Tag::DateTimeOriginal, ascii("yesterday"))]);
        let tags = decode_photo_tags(&jpeg).expect("exif present");
        assert!(tags.captured_at.is_none());
    }
}
