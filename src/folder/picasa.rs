use std::{fs, io, path::Path};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::warn;

use super::{FolderError, FolderResult};

/// Per-folder metadata file written by Picasa.
pub const PICASA_INI: &str = ".picasa.ini";

const DATE_KEY: &str = "date=";
const MILLIS_PER_DAY: f64 = 86_400_000.0;
// Far beyond any representable date; keeps the cast to i64 exact.
const MAX_MILLIS: f64 = 1e15;

/// Converts a Picasa `date=` value, fractional days counted from 1899-12-30.
pub fn parse_picasa_date(value: &str) -> Option<NaiveDateTime> {
  let days: f64 = value.trim().parse().ok()?;
  let millis = ((days - 2.0) * MILLIS_PER_DAY).round();
  if !millis.is_finite() || millis.abs() > MAX_MILLIS {
    return None;
  }

  NaiveDate::from_ymd_opt(1900, 1, 1)?
    .and_hms_opt(0, 0, 0)?
    .checked_add_signed(Duration::milliseconds(millis as i64))
}

/// The date recorded in the `.picasa.ini` of `dir`, from its first `date=` line.
///
/// `Ok(None)` without the file, without a date line, or with a value that is
/// not a number.
pub fn read_picasa_date(dir: &Path) -> FolderResult<Option<NaiveDateTime>> {
  let path = dir.join(PICASA_INI);
  let contents = match fs::read(&path) {
    Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
    Err(e) => return Err(FolderError::io(path, e)),
  };

  let value = match contents.lines().find_map(|line| line.strip_prefix(DATE_KEY)) {
    Some(value) => value,
    None => return Ok(None),
  };
  let date = parse_picasa_date(value);
  if date.is_none() {
    warn!("{}: unreadable date {:?}", path.display(), value);
  }
  Ok(date)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fractional_days() {
    let expected = NaiveDate::from_ymd_opt(2011, 7, 15).and_then(|d| d.and_hms_opt(12, 0, 0));
    assert_eq!(parse_picasa_date("40739.5"), expected);
  }

  #[test]
  fn rejects_garbage() {
    assert_eq!(parse_picasa_date("yesterday"), None);
    assert_eq!(parse_picasa_date("1e300"), None);
    assert_eq!(parse_picasa_date("NaN"), None);
  }

  #[test]
  fn reads_first_date_line() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(PICASA_INI), "[Picasa]\nname=Zoo\ndate=40739.5\ndate=1.0\n").unwrap();
    let date = read_picasa_date(dir.path()).unwrap().unwrap();
    assert_eq!(date.to_string(), "2011-07-15 12:00:00");
  }

  #[test]
  fn missing_file_or_key() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(read_picasa_date(dir.path()).unwrap(), None);
    fs::write(dir.path().join(PICASA_INI), "[Picasa]\nname=Zoo\n").unwrap();
    assert_eq!(read_picasa_date(dir.path()).unwrap(), None);
  }
}
