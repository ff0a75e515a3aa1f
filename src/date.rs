//! Exif date/time strings.
//!
//! Exif stores dates as ASCII, either `YYYY:MM:DD HH:MM:SS` or a plain
//! `YYYY:MM:DD` (GPS date stamps). A date the camera did not know may be left
//! with every character except the colons replaced by blanks or zeros.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::{ExifFormatError, ExifResult};

const DATE_FORMAT: &str = "%Y:%m:%d";
const DATE_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
const DATE_LEN: usize = 10;

fn blank_pattern() -> &'static Regex {
  static BLANK: OnceLock<Regex> = OnceLock::new();
  BLANK.get_or_init(|| {
    // The time part is optional, as in the date-only form.
    Regex::new(r"^[\s0]{4}[:\s][\s0]{2}[:\s][\s0]{2}([\s0]{3}[:\s][\s0]{2}[:\s][\s0]{2})?$")
      .expect("blank date pattern is valid")
  })
}

/// Whether `s` is the Exif "unknown date" placeholder.
pub fn is_blank(s: &str) -> bool {
  s.is_empty() || blank_pattern().is_match(s)
}

/// Parses an Exif date string.
///
/// Returns `Ok(None)` for empty or blank strings. Ten character strings are
/// read as a date at midnight.
pub fn parse_datetime(s: &str) -> ExifResult<Option<NaiveDateTime>> {
  if is_blank(s) {
    return Ok(None);
  }

  let parsed = if s.len() == DATE_LEN {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map(|d| d.and_time(NaiveTime::MIN))
  } else {
    NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT)
  };

  parsed.map(Some).map_err(|_| ExifFormatError::InvalidDateTime(s.to_owned()).into())
}

#[cfg(test)]
mod tests {
  use chrono::{Datelike, Timelike};

  use super::*;
  use crate::ExifError;

  #[test]
  fn full_date_time() {
    let dt = parse_datetime("2011:07:14 18:03:59").unwrap().unwrap();
    assert_eq!((dt.year(), dt.month(), dt.day()), (2011, 7, 14));
    assert_eq!((dt.hour(), dt.minute(), dt.second()), (18, 3, 59));
  }

  #[test]
  fn date_only_is_midnight() {
    let dt = parse_datetime("2009:02:28").unwrap().unwrap();
    assert_eq!(dt, NaiveDate::from_ymd_opt(2009, 2, 28).unwrap().and_hms_opt(0, 0, 0).unwrap());
  }

  #[test]
  fn blank_placeholders() {
    assert!(is_blank(""));
    assert!(is_blank("    :  :     :  :  "));
    assert!(is_blank("0000:00:00 00:00:00"));
    assert!(is_blank("0000:00:00   :  :  "));
    assert_eq!(parse_datetime("    :  :     :  :  ").unwrap(), None);
    assert_eq!(parse_datetime("0000:00:00 00:00:00").unwrap(), None);
  }

  #[test]
  fn blank_date_only_placeholders() {
    assert!(is_blank("0000:00:00"));
    assert!(is_blank("    :  :  "));
    assert_eq!(parse_datetime("0000:00:00").unwrap(), None);
    assert!(!is_blank("0000:00:00 00"));
  }

  #[test]
  fn real_dates_are_not_blank() {
    assert!(!is_blank("2000:01:01 00:00:00"));
    assert!(!is_blank("2000:01:01"));
  }

  #[test]
  fn garbage_is_a_format_error() {
    match parse_datetime("yesterday") {
      Err(ExifError::FormatError(ExifFormatError::InvalidDateTime(s))) => assert_eq!(s, "yesterday"),
      other => panic!("unexpected result {other:?}"),
    }
    assert!(parse_datetime("2011:13:01 00:00:00").is_err());
  }
}
