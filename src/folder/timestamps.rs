use std::{
  fs::{self, File, FileTimes},
  io,
  path::{Path, PathBuf},
  time::SystemTime,
};

use chrono::{NaiveDateTime, NaiveTime};
use log::{debug, info, warn};

use super::{
  date_from_folder_name, local_datetime, read_picasa_date, system_time, FolderError, FolderResult,
};

/// Settings of [`sync_folder_times`].
#[derive(Clone, Debug)]
pub struct TimestampOptions {
  /// Files modified at most this many days after the folder date are left alone.
  pub min_days_diff: i64,
  pub recursive: bool,
}

impl Default for TimestampOptions {
  fn default() -> TimestampOptions {
    TimestampOptions { min_days_diff: 365, recursive: true }
  }
}

/// Moves the timestamps of files back to the date of their folder.
///
/// Every folder below `root` is dated by its `.picasa.ini`, or else by a
/// date at the start of its name. Files directly inside a dated folder whose
/// modification time lies more than `min_days_diff` days after that date get
/// their modification and access times set to it. `root` itself is not
/// dated. Returns the number of files changed.
pub fn sync_folder_times(root: &Path, options: &TimestampOptions) -> FolderResult<usize> {
  if !root.is_dir() {
    return Err(FolderError::NotADirectory(root.to_path_buf()));
  }
  sync_subfolders(root, options)
}

fn sync_subfolders(dir: &Path, options: &TimestampOptions) -> FolderResult<usize> {
  let subfolders = list_dir(dir, true)?;
  if !subfolders.is_empty() {
    debug!("{} folders in {}", subfolders.len(), dir.display());
  }

  let mut changed = 0;
  for subfolder in subfolders {
    if let Some(date) = folder_date(&subfolder) {
      match sync_files(&subfolder, date, options) {
        Ok(n) => changed += n,
        Err(e) => warn!("{}", e),
      }
    }
    if options.recursive {
      match sync_subfolders(&subfolder, options) {
        Ok(n) => changed += n,
        Err(e) => warn!("{}", e),
      }
    }
  }
  Ok(changed)
}

fn folder_date(dir: &Path) -> Option<NaiveDateTime> {
  let picasa = read_picasa_date(dir).unwrap_or_else(|e| {
    warn!("{}", e);
    None
  });
  if let Some(date) = picasa {
    debug!("found Picasa date {} for {}", date, dir.display());
    return Some(date);
  }

  let name = dir.file_name()?.to_string_lossy();
  let date = date_from_folder_name(&name)?.and_time(NaiveTime::MIN);
  debug!("found date {} in folder name {}", date, dir.display());
  Some(date)
}

fn sync_files(dir: &Path, date: NaiveDateTime, options: &TimestampOptions) -> FolderResult<usize> {
  let time = match system_time(date) {
    Some(time) => time,
    None => {
      warn!("{}: {} does not exist in the local time zone", dir.display(), date);
      return Ok(0);
    }
  };

  let mut changed = 0;
  for file in list_dir(dir, false)? {
    let modified = match fs::metadata(&file).and_then(|metadata| metadata.modified()) {
      Ok(modified) => local_datetime(modified),
      Err(e) => {
        warn!("{}: {}", file.display(), e);
        continue;
      }
    };
    if (modified - date).num_days() <= options.min_days_diff {
      continue;
    }

    match set_file_times(&file, time) {
      Ok(()) => {
        info!("change {} to {} for {}", modified, date, file.display());
        changed += 1;
      }
      Err(e) => warn!("cannot change times of {}: {}", file.display(), e),
    }
  }
  Ok(changed)
}

fn set_file_times(path: &Path, time: SystemTime) -> io::Result<()> {
  let file = File::options().write(true).open(path)?;
  file.set_times(FileTimes::new().set_accessed(time).set_modified(time))
}

// Sorted subfolders, or sorted regular files, of `dir`.
fn list_dir(dir: &Path, folders: bool) -> FolderResult<Vec<PathBuf>> {
  let mut paths = Vec::new();
  for entry in fs::read_dir(dir).map_err(|e| FolderError::io(dir, e))? {
    let entry = entry.map_err(|e| FolderError::io(dir, e))?;
    let file_type = entry.file_type().map_err(|e| FolderError::io(entry.path(), e))?;
    if (folders && file_type.is_dir()) || (!folders && file_type.is_file()) {
      paths.push(entry.path());
    }
  }
  paths.sort();
  Ok(paths)
}
