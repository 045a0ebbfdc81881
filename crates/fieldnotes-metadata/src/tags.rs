//! EXIF tag decoding: GPS position and capture time.
//!
//! Pure and synchronous. Callers decide what to do when the container cannot
//! be read at all; this module only answers "what do the tags say".

use std::io::Cursor;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone as _, Utc};
use exif::{Exif, In, Tag, Value};
use fieldnotes_core::metadata::{Candidate, first_present};

/// Capture-time tags in precedence order, each with the tag holding its UTC
/// offset.
const TIME_TAGS: [(&str, Tag, Tag); 3] = [
  ("DateTimeOriginal", Tag::DateTimeOriginal, Tag::OffsetTimeOriginal),
  ("DateTime", Tag::DateTime, Tag::OffsetTime),
  ("DateTimeDigitized", Tag::DateTimeDigitized, Tag::OffsetTimeDigitized),
];

/// Parse the EXIF block of any container `kamadak-exif` understands (JPEG,
/// TIFF, PNG, WebP, HEIF).
pub fn read(bytes: &[u8]) -> Result<Exif, exif::Error> {
  exif::Reader::new().read_from_container(&mut Cursor::new(bytes))
}

// ─── GPS ─────────────────────────────────────────────────────────────────────

/// Signed decimal `(latitude, longitude)`, if both are present and in range.
pub fn coordinates(exif: &Exif) -> Option<(f64, f64)> {
  let lat = coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, 90.0)?;
  let lng = coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, 180.0)?;
  Some((lat, lng))
}

fn coordinate(exif: &Exif, value_tag: Tag, ref_tag: Tag, max: f64) -> Option<f64> {
  let field = exif.get_field(value_tag, In::PRIMARY)?;

  // Degree/minute/second triplets are the standard encoding; some writers
  // store a single decimal value instead.
  let (_, magnitude) = first_present([
    Candidate::new("dms", degrees_from_dms(&field.value)),
    Candidate::new("decimal", degrees_from_decimal(&field.value)),
  ])?;

  let reference = exif.get_field(ref_tag, In::PRIMARY).map(|f| &f.value);
  let degrees = magnitude * hemisphere_sign(reference);

  (degrees.is_finite() && degrees.abs() <= max).then_some(degrees)
}

/// `d + m/60 + s/3600` from a three-element rational or floating value.
pub fn degrees_from_dms(value: &Value) -> Option<f64> {
  let parts: Vec<f64> = match value {
    Value::Rational(r) if r.len() == 3 => r.iter().map(|x| x.to_f64()).collect(),
    Value::Double(d) if d.len() == 3 => d.clone(),
    Value::Float(f) if f.len() == 3 => f.iter().map(|&x| f64::from(x)).collect(),
    _ => return None,
  };
  let degrees = parts[0] + parts[1] / 60.0 + parts[2] / 3600.0;
  degrees.is_finite().then_some(degrees)
}

/// A single value already expressed in decimal degrees.
pub fn degrees_from_decimal(value: &Value) -> Option<f64> {
  let degrees = match value {
    Value::Rational(r) if r.len() == 1 => r[0].to_f64(),
    Value::SRational(r) if r.len() == 1 => r[0].to_f64(),
    Value::Double(d) if d.len() == 1 => d[0],
    Value::Float(f) if f.len() == 1 => f64::from(f[0]),
    _ => return None,
  };
  degrees.is_finite().then_some(degrees)
}

/// `-1.0` for southern and western references, `1.0` otherwise (including a
/// missing reference).
pub fn hemisphere_sign(reference: Option<&Value>) -> f64 {
  match reference.and_then(first_ascii).and_then(|s| s.first().copied()) {
    Some(b'S' | b's' | b'W' | b'w') => -1.0,
    _ => 1.0,
  }
}

// ─── Capture time ────────────────────────────────────────────────────────────

/// Capture-time candidates from the tags, in precedence order. Callers may
/// append further candidates (e.g. the file's modification time) before
/// picking with [`first_present`].
pub fn timestamp_candidates(exif: &Exif) -> Vec<Candidate<DateTime<Utc>>> {
  TIME_TAGS
    .iter()
    .map(|&(name, time_tag, offset_tag)| {
      let value = exif.get_field(time_tag, In::PRIMARY).and_then(|f| {
        let offset = exif.get_field(offset_tag, In::PRIMARY).map(|o| &o.value);
        exif_datetime(&f.value, offset)
      });
      Candidate::new(name, value)
    })
    .collect()
}

/// Decode an EXIF `YYYY:MM:DD HH:MM:SS` value. Without an offset tag the
/// time is taken to be UTC.
pub fn exif_datetime(value: &Value, offset: Option<&Value>) -> Option<DateTime<Utc>> {
  let mut dt = exif::DateTime::from_ascii(first_ascii(value)?).ok()?;
  if let Some(raw) = offset.and_then(first_ascii) {
    // A malformed offset leaves the time as UTC.
    let _ = dt.parse_offset(raw);
  }
  to_utc(&dt)
}

fn to_utc(dt: &exif::DateTime) -> Option<DateTime<Utc>> {
  let naive = NaiveDate::from_ymd_opt(i32::from(dt.year), dt.month.into(), dt.day.into())?
    .and_hms_nano_opt(
      dt.hour.into(),
      dt.minute.into(),
      dt.second.into(),
      dt.nanosecond.unwrap_or(0),
    )?;

  match dt.offset {
    Some(minutes) => FixedOffset::east_opt(i32::from(minutes) * 60)?
      .from_local_datetime(&naive)
      .single()
      .map(|t| t.with_timezone(&Utc)),
    None => Some(naive.and_utc()),
  }
}

fn first_ascii(value: &Value) -> Option<&[u8]> {
  match value {
    Value::Ascii(v) => v.first().map(Vec::as_slice),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;
  use exif::{Rational, SRational};

  use super::*;

  fn r(num: u32, denom: u32) -> Rational { Rational { num, denom } }

  fn ascii(s: &str) -> Value { Value::Ascii(vec![s.as_bytes().to_vec()]) }

  #[test]
  fn dms_triplet_converts_to_degrees() {
    let v = Value::Rational(vec![r(51, 1), r(30, 1), r(36, 1)]);
    let deg = degrees_from_dms(&v).unwrap();
    assert!((deg - 51.51).abs() < 1e-9);
  }

  #[test]
  fn dms_rejects_zero_denominator() {
    let v = Value::Rational(vec![r(51, 0), r(30, 1), r(0, 1)]);
    assert_eq!(degrees_from_dms(&v), None);
  }

  #[test]
  fn single_value_is_read_as_decimal() {
    let v = Value::SRational(vec![SRational { num: -1234, denom: 100 }]);
    assert_eq!(degrees_from_dms(&v), None);
    assert_eq!(degrees_from_decimal(&v), Some(-12.34));
  }

  #[test]
  fn south_and_west_are_negative() {
    assert_eq!(hemisphere_sign(Some(&ascii("S"))), -1.0);
    assert_eq!(hemisphere_sign(Some(&ascii("W"))), -1.0);
    assert_eq!(hemisphere_sign(Some(&ascii("N"))), 1.0);
    assert_eq!(hemisphere_sign(None), 1.0);
  }

  #[test]
  fn datetime_without_offset_is_utc() {
    let at = exif_datetime(&ascii("2024:09:14 10:32:05"), None).unwrap();
    assert_eq!(at, Utc.with_ymd_and_hms(2024, 9, 14, 10, 32, 5).unwrap());
  }

  #[test]
  fn datetime_offset_is_applied() {
    let at = exif_datetime(&ascii("2024:09:14 10:32:05"), Some(&ascii("+02:00"))).unwrap();
    assert_eq!(at, Utc.with_ymd_and_hms(2024, 9, 14, 8, 32, 5).unwrap());
  }

  #[test]
  fn blank_datetime_is_ignored() {
    assert_eq!(exif_datetime(&ascii("    :  :     :  :  "), None), None);
    assert_eq!(exif_datetime(&Value::Byte(vec![1, 2]), None), None);
  }

  #[test]
  fn non_image_bytes_fail_to_read() {
    assert!(read(b"definitely not an image").is_err());
  }
}
