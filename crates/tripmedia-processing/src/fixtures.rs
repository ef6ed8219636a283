//! In-memory photo builders for tests

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use std::io::Cursor;

pub fn rational(num: u32, denom: u32) -> Rational {
    Rational { num, denom }
}

pub fn ascii(s: &str) -> Value {
    Value::Ascii(vec![s.as_bytes().to_vec()])
}

pub fn field(tag: Tag, value: Value) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    }
}

/// Wrap a TIFF-encoded EXIF block into a minimal JPEG (SOI, APP1, EOI).
pub fn jpeg_with_fields(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for f in fields {
        writer.push_field(f);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).expect("write exif");
    let tiff = tiff.into_inner();

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let len = (2 + 6 + tiff.len()) as u16;
    jpeg.extend_from_slice(&len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// Madrid: 40°25'0.48"N 3°42'13.68"W, 650 m, taken 2023-07-14 18:30:05
pub fn madrid_fields() -> Vec<Field> {
    vec![
        field(
            Tag::GPSLatitude,
            Value::Rational(vec![rational(40, 1), rational(25, 1), rational(48, 100)]),
        ),
        field(Tag::GPSLatitudeRef, ascii("N")),
        field(
            Tag::GPSLongitude,
            Value::Rational(vec![rational(3, 1), rational(42, 1), rational(1368, 100)]),
        ),
        field(Tag::GPSLongitudeRef, ascii("W")),
        field(Tag::GPSAltitude, Value::Rational(vec![rational(650, 1)])),
        field(Tag::GPSAltitudeRef, Value::Byte(vec![0])),
        field(Tag::DateTimeOriginal, ascii("2023:07:14 18:30:05")),
    ]
}

/// JPEG carrying the Madrid GPS block
pub fn madrid_jpeg() -> Vec<u8> {
    jpeg_with_fields(&madrid_fields())
}

/// JPEG with a capture time but no GPS tags
pub fn jpeg_without_gps() -> Vec<u8> {
    jpeg_with_fields(&[field(Tag::DateTimeOriginal, ascii("2022:05:01 09:00:00"))])
}
