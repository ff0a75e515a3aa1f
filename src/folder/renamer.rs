use std::{
  ffi::OsStr,
  fmt::{self, Write},
  fs,
  path::{Path, PathBuf},
};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};

use super::{date_from_folder_name, is_numeric, local_datetime, FolderError, FolderResult};
use crate::decoder::Decoder;

/// Exif dates before this year are camera clocks that were never set.
pub const MIN_EXIF_YEAR: i32 = 1995;

const FOLDER_PLACEHOLDER: &str = "[folder]";
const NAME_SLOT: &str = "[]";
const XMP_EXTENSION: &str = "xmp";

/// What [`FolderRenamer`] looks at and how it names folders.
#[derive(Clone, Debug)]
pub struct RenameOptions {
  /// chrono strftime pattern of the new name. `[folder]` stands for the
  /// current folder name.
  pub date_pattern: String,
  /// Extensions of the files that date a folder, matched case-insensitively.
  pub extensions: Vec<String>,
  pub use_exif: bool,
  /// Fall back to the earliest file time when no image carries an Exif date.
  pub use_file_date_if_no_exif: bool,
  /// Descend into the subfolders of folders that were considered.
  pub recursive: bool,
  /// Never rename the root itself. Its direct subfolders are always visited.
  pub skip_top_level: bool,
  pub skip_numeric: bool,
  /// Folder names to leave alone, together with everything below them.
  pub skip_folders: Vec<String>,
  pub skip_if_has_xmp: bool,
  pub skip_if_name_has_date: bool,
}

impl Default for RenameOptions {
  fn default() -> RenameOptions {
    RenameOptions {
      date_pattern: "%Y-%m-%d [folder]".to_string(),
      extensions: vec!["jpg".to_string(), "jpeg".to_string()],
      use_exif: true,
      use_file_date_if_no_exif: true,
      recursive: true,
      skip_top_level: true,
      skip_numeric: false,
      skip_folders: Vec::new(),
      skip_if_has_xmp: false,
      skip_if_name_has_date: false,
    }
  }
}

/// Where a folder date came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateSource {
  Exif,
  FileTime,
}

/// A planned folder rename.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rename {
  pub from: PathBuf,
  pub to: PathBuf,
  pub date: NaiveDateTime,
  pub source: DateSource,
}

/// Why a dated folder keeps its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
  /// The name already reads like the formatted date.
  AlreadyNamed,
  /// The name starts with a date and such names are left alone.
  HasDate(NaiveDate),
  /// The name starts with a date in the same month.
  SameMonth,
}

impl fmt::Display for SkipReason {
  fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      SkipReason::AlreadyNamed => write!(fmt, "folder name already contains the same date"),
      SkipReason::HasDate(date) => write!(fmt, "folder name already contains a date {}", date),
      SkipReason::SameMonth => write!(fmt, "folder name already contains the same month"),
    }
  }
}

// Directory contents relevant to a folder decision.
struct Listing {
  images: Vec<PathBuf>,
  subfolders: Vec<PathBuf>,
  has_xmp: bool,
}

/// Plans renames over a folder tree, then applies them.
#[derive(Debug)]
pub struct FolderRenamer {
  options: RenameOptions,
  pattern: String,
  queue: Vec<Rename>,
}

impl FolderRenamer {
  /// Fails if the date pattern holds a directive chrono cannot format.
  pub fn new(options: RenameOptions) -> FolderResult<FolderRenamer> {
    let pattern = options.date_pattern.replace(FOLDER_PLACEHOLDER, NAME_SLOT);

    // chrono only reports bad directives while formatting.
    let mut sample = String::new();
    if write!(sample, "{}", NaiveDateTime::default().format(&pattern)).is_err() {
      return Err(FolderError::InvalidPattern(options.date_pattern));
    }

    Ok(FolderRenamer { options, pattern, queue: Vec::new() })
  }

  pub fn options(&self) -> &RenameOptions {
    &self.options
  }

  /// Renames planned so far, parents before their children.
  pub fn queue(&self) -> &[Rename] {
    &self.queue
  }

  /// Walks `root` and queues a rename for every folder that gets a new name.
  pub fn scan(&mut self, root: &Path) -> FolderResult<()> {
    if !root.is_dir() {
      return Err(FolderError::NotADirectory(root.to_path_buf()));
    }
    self.visit(root, 0)
  }

  fn visit(&mut self, dir: &Path, depth: usize) -> FolderResult<()> {
    let name = folder_name(dir);
    // The root was picked explicitly, hidden or not.
    if depth > 0 && name.starts_with('.') {
      debug!("skipping hidden folder {}", dir.display());
      return Ok(());
    }

    debug!("checking {}", dir.display());
    let listing = self.read_listing(dir)?;

    if depth == 0 && self.options.skip_top_level {
      info!("skipping top level: {}", name);
      return self.visit_subfolders(&listing, depth);
    }
    if self.options.skip_numeric && is_numeric(&name) {
      info!("skipping numeric: {}", name);
      return self.visit_subfolders(&listing, depth);
    }
    if self.options.skip_folders.iter().any(|skip| *skip == name) {
      info!("skipping: {}", name);
      return Ok(());
    }
    if self.options.skip_if_has_xmp && listing.has_xmp {
      info!("skipping {}: holds an xmp file", name);
      return self.visit_subfolders(&listing, depth);
    }

    let (date, source) = match self.folder_date(&listing.images) {
      Some(found) => found,
      None => {
        info!("skipping {}: no dates found", name);
        return Ok(());
      }
    };

    match self.plan_name(&name, date) {
      Ok(new_name) => {
        let to = dir.with_file_name(&new_name);
        info!("rename {} >> {}", name, to.display());
        self.queue.push(Rename { from: dir.to_path_buf(), to, date, source });
        self.visit_subfolders(&listing, depth)
      }
      Err(reason) => {
        info!("skipping {}: {}", name, reason);
        Ok(())
      }
    }
  }

  fn visit_subfolders(&mut self, listing: &Listing, depth: usize) -> FolderResult<()> {
    let descend = self.options.recursive || (depth == 0 && self.options.skip_top_level);
    if !descend {
      return Ok(());
    }
    for subfolder in &listing.subfolders {
      // One unreadable folder must not end the whole scan.
      if let Err(e) = self.visit(subfolder, depth + 1) {
        warn!("{}", e);
      }
    }
    Ok(())
  }

  fn read_listing(&self, dir: &Path) -> FolderResult<Listing> {
    let mut listing = Listing { images: Vec::new(), subfolders: Vec::new(), has_xmp: false };

    for entry in fs::read_dir(dir).map_err(|e| FolderError::io(dir, e))? {
      let entry = entry.map_err(|e| FolderError::io(dir, e))?;
      let path = entry.path();
      let file_type = entry.file_type().map_err(|e| FolderError::io(&path, e))?;

      if file_type.is_dir() {
        listing.subfolders.push(path);
      } else if file_type.is_file() {
        if has_extension(&path, XMP_EXTENSION) {
          listing.has_xmp = true;
        }
        if self.options.extensions.iter().any(|ext| has_extension(&path, ext)) {
          listing.images.push(path);
        }
      }
    }

    listing.images.sort();
    listing.subfolders.sort();
    Ok(listing)
  }

  /// The date of a folder holding `images`.
  ///
  /// The first plausible Exif capture date wins. Without one, the earliest
  /// modified, accessed or created time of the images is used if allowed.
  pub fn folder_date(&self, images: &[PathBuf]) -> Option<(NaiveDateTime, DateSource)> {
    if self.options.use_exif {
      for image in images {
        match Decoder::open(image).and_then(|mut decoder| decoder.date_taken()) {
          Ok(Some(date)) if date.year() >= MIN_EXIF_YEAR => {
            debug!("found Exif date {} in {}", date, image.display());
            return Some((date, DateSource::Exif));
          }
          Ok(_) => {}
          Err(e) => warn!("{}: {}", image.display(), e),
        }
      }
    }

    if !self.options.use_file_date_if_no_exif {
      return None;
    }
    images.iter().filter_map(|image| earliest_file_time(image)).min().map(|date| (date, DateSource::FileTime))
  }

  /// The new name for folder `name` dated `date`, or why it keeps its name.
  pub fn plan_name(&self, name: &str, date: NaiveDateTime) -> Result<String, SkipReason> {
    // The pattern was checked in `new`.
    let date_string = date.format(&self.pattern).to_string();

    let first_word = name.split(' ').next().unwrap_or(name);
    if date_string.contains(name) || date_string.contains(first_word) {
      return Err(SkipReason::AlreadyNamed);
    }

    if let Some(existing) = date_from_folder_name(name) {
      if self.options.skip_if_name_has_date {
        return Err(SkipReason::HasDate(existing));
      }
      if existing.year() == date.year() && existing.month() == date.month() {
        return Err(SkipReason::SameMonth);
      }
    }

    Ok(date_string.replace(NAME_SLOT, name))
  }

  /// Applies the queued renames, children before their parents, and empties
  /// the queue.
  ///
  /// A failed rename is logged and the others still go ahead. Returns the
  /// number of folders renamed.
  pub fn rename_folders(&mut self) -> usize {
    let mut renamed = 0;
    for rename in std::mem::take(&mut self.queue).into_iter().rev() {
      if rename.to.exists() {
        warn!("cannot rename {}: {} already exists", rename.from.display(), rename.to.display());
        continue;
      }
      match fs::rename(&rename.from, &rename.to) {
        Ok(()) => {
          info!("renamed {} >> {}", rename.from.display(), rename.to.display());
          renamed += 1;
        }
        Err(e) => warn!("cannot rename {}: {}", rename.from.display(), e),
      }
    }
    renamed
  }
}

fn folder_name(dir: &Path) -> String {
  dir.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}

fn has_extension(path: &Path, extension: &str) -> bool {
  let extension = extension.trim_start_matches('*').trim_start_matches('.');
  path.extension().and_then(OsStr::to_str).map_or(false, |ext| ext.eq_ignore_ascii_case(extension))
}

fn earliest_file_time(path: &Path) -> Option<NaiveDateTime> {
  let metadata = match fs::metadata(path) {
    Ok(metadata) => metadata,
    Err(e) => {
      warn!("{}: {}", path.display(), e);
      return None;
    }
  };
  // Creation time is not available on every platform.
  [metadata.modified(), metadata.accessed(), metadata.created()]
    .into_iter()
    .filter_map(Result::ok)
    .min()
    .map(local_datetime)
}
