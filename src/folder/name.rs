use chrono::NaiveDate;

// Tried in order on the first word of a folder name.
const DAY_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y_%m_%d", "%Y.%m.%d", "%Y%m%d"];

/// Reads a date from the start of a folder name such as `2011-07-14 Holiday`.
///
/// Only the first space separated word is considered. A bare year and month
/// (`2011-07`) resolves to the first of that month.
pub fn date_from_folder_name(name: &str) -> Option<NaiveDate> {
  let token = name.split(' ').next()?;
  if token.is_empty() {
    return None;
  }

  DAY_FORMATS
    .iter()
    .find_map(|format| NaiveDate::parse_from_str(token, format).ok())
    .or_else(|| NaiveDate::parse_from_str(&format!("{token}-01"), "%Y-%m-%d").ok())
}

/// Whether the name consists of ASCII digits only, like `2011` or `07`.
pub fn is_numeric(name: &str) -> bool {
  !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
  }

  #[test]
  fn day_formats() {
    assert_eq!(date_from_folder_name("2011-07-14 Holiday"), ymd(2011, 7, 14));
    assert_eq!(date_from_folder_name("2011_07_14"), ymd(2011, 7, 14));
    assert_eq!(date_from_folder_name("2011.07.14 Zoo"), ymd(2011, 7, 14));
    assert_eq!(date_from_folder_name("20110714"), ymd(2011, 7, 14));
  }

  #[test]
  fn month_only() {
    assert_eq!(date_from_folder_name("2011-07 Summer"), ymd(2011, 7, 1));
  }

  #[test]
  fn names_without_date() {
    assert_eq!(date_from_folder_name("Holiday 2011"), None);
    assert_eq!(date_from_folder_name(" 2011-07-14"), None);
    assert_eq!(date_from_folder_name("2011"), None);
    assert_eq!(date_from_folder_name("2011-13-01"), None);
    assert_eq!(date_from_folder_name(""), None);
  }

  #[test]
  fn numeric_names() {
    assert!(is_numeric("2011"));
    assert!(is_numeric("07"));
    assert!(!is_numeric("2011-07"));
    assert!(!is_numeric(""));
  }
}
