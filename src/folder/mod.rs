//! Photo folder housekeeping on top of the Exif [`decoder`](crate::decoder).
//!
//! A folder is dated after the pictures it holds. [`FolderRenamer`] plans and
//! applies renames that put that date in front of the folder name, and
//! [`sync_folder_times`] rewrites the timestamps of files that were copied
//! long after the date recorded for their folder.

use std::{error::Error, fmt, io, path::PathBuf, time::SystemTime};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

mod name;
mod picasa;
mod renamer;
mod timestamps;

pub use self::{
  name::{date_from_folder_name, is_numeric},
  picasa::{parse_picasa_date, read_picasa_date, PICASA_INI},
  renamer::{DateSource, FolderRenamer, Rename, RenameOptions, SkipReason, MIN_EXIF_YEAR},
  timestamps::{sync_folder_times, TimestampOptions},
};

/// Errors of the folder layer.
#[derive(Debug)]
pub enum FolderError {
  /// The path handed in is not a directory.
  NotADirectory(PathBuf),

  /// The date pattern holds a strftime directive chrono does not know.
  InvalidPattern(String),

  /// An I/O error on `path`.
  Io { path: PathBuf, source: io::Error },
}

impl FolderError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> FolderError {
    FolderError::Io { path: path.into(), source }
  }
}

impl fmt::Display for FolderError {
  fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      FolderError::NotADirectory(ref path) => write!(fmt, "{} is not a directory.", path.display()),
      FolderError::InvalidPattern(ref pattern) => write!(fmt, "Invalid date pattern {:?}.", pattern),
      FolderError::Io { ref path, ref source } => write!(fmt, "{}: {}", path.display(), source),
    }
  }
}

impl Error for FolderError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match *self {
      FolderError::Io { ref source, .. } => Some(source),
      _ => None,
    }
  }
}

/// Result of a folder operation
pub type FolderResult<T> = Result<T, FolderError>;

// File times are compared against Exif and folder dates, which carry no zone.
pub(crate) fn local_datetime(time: SystemTime) -> NaiveDateTime {
  DateTime::<Local>::from(time).naive_local()
}

pub(crate) fn system_time(date: NaiveDateTime) -> Option<SystemTime> {
  Local.from_local_datetime(&date).earliest().map(SystemTime::from)
}
