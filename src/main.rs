//! exif-dater - dates photo folders after the pictures they hold.

use std::{path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exif_dater::{
  decoder::{Decoder, DATE_TAKEN_TAGS},
  folder::{sync_folder_times, DateSource, FolderRenamer, RenameOptions, TimestampOptions},
};

/// Renames photo folders after the Exif capture dates of their pictures.
#[derive(Parser, Debug)]
#[command(name = "exif-dater")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging.
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Put the date of the pictures in front of folder names.
  ///
  /// Only prints the plan unless --apply is given.
  Rename(RenameArgs),

  /// Move file timestamps back to the date of their folder.
  SyncTimes(SyncTimesArgs),

  /// Print the Exif dates of JPEG files.
  Inspect {
    #[arg(required = true)]
    files: Vec<PathBuf>,
  },
}

#[derive(Args, Debug)]
struct RenameArgs {
  /// Folder tree to rename.
  root: PathBuf,

  /// chrono strftime pattern of the new name; `[folder]` is the old name.
  #[arg(long, default_value = "%Y-%m-%d [folder]")]
  pattern: String,

  /// Extensions of the pictures that date a folder.
  #[arg(long, value_delimiter = ',', default_values = ["jpg", "jpeg"])]
  extensions: Vec<String>,

  /// Do not read Exif dates.
  #[arg(long)]
  no_exif: bool,

  /// Do not fall back to file times.
  #[arg(long)]
  no_file_dates: bool,

  /// Only look at the first level of folders.
  #[arg(long)]
  no_recurse: bool,

  /// Consider the root folder itself for renaming.
  #[arg(long)]
  include_top_level: bool,

  /// Skip folders named with digits only.
  #[arg(long)]
  skip_numeric: bool,

  /// Folder name to leave alone, with everything below it. Repeatable.
  #[arg(long = "skip", value_name = "NAME")]
  skip_folders: Vec<String>,

  /// Skip folders holding an .xmp file.
  #[arg(long)]
  skip_xmp: bool,

  /// Skip folders whose name already starts with a date.
  #[arg(long)]
  skip_dated: bool,

  /// Rename the folders instead of only listing the plan.
  #[arg(long)]
  apply: bool,
}

impl RenameArgs {
  fn options(&self) -> RenameOptions {
    RenameOptions {
      date_pattern: self.pattern.clone(),
      extensions: self.extensions.clone(),
      use_exif: !self.no_exif,
      use_file_date_if_no_exif: !self.no_file_dates,
      recursive: !self.no_recurse,
      skip_top_level: !self.include_top_level,
      skip_numeric: self.skip_numeric,
      skip_folders: self.skip_folders.clone(),
      skip_if_has_xmp: self.skip_xmp,
      skip_if_name_has_date: self.skip_dated,
    }
  }
}

#[derive(Args, Debug)]
struct SyncTimesArgs {
  /// Folder tree whose files are re-dated.
  root: PathBuf,

  /// Leave files alone unless they are this many days newer than their folder.
  #[arg(long, default_value_t = 365)]
  min_days: i64,

  /// Only look at the first level of folders.
  #[arg(long)]
  no_recurse: bool,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  match cli.command {
    Command::Rename(args) => run_rename(args),
    Command::SyncTimes(args) => run_sync_times(args),
    Command::Inspect { files } => run_inspect(&files),
  }
}

fn run_rename(args: RenameArgs) -> ExitCode {
  let mut renamer = match FolderRenamer::new(args.options()) {
    Ok(renamer) => renamer,
    Err(e) => {
      error!("Configuration error: {}", e);
      return ExitCode::FAILURE;
    }
  };

  if let Err(e) = renamer.scan(&args.root) {
    error!("{}", e);
    return ExitCode::FAILURE;
  }

  for rename in renamer.queue() {
    let source = match rename.source {
      DateSource::Exif => "exif",
      DateSource::FileTime => "file time",
    };
    println!("{} >> {} ({}, {})", rename.from.display(), rename.to.display(), rename.date, source);
  }

  if !args.apply {
    info!("{} folders to rename, run with --apply to rename them", renamer.queue().len());
    return ExitCode::SUCCESS;
  }

  let planned = renamer.queue().len();
  let renamed = renamer.rename_folders();
  info!("renamed {} of {} folders", renamed, planned);
  if renamed < planned {
    return ExitCode::FAILURE;
  }
  ExitCode::SUCCESS
}

fn run_sync_times(args: SyncTimesArgs) -> ExitCode {
  let options = TimestampOptions { min_days_diff: args.min_days, recursive: !args.no_recurse };
  match sync_folder_times(&args.root, &options) {
    Ok(changed) => {
      info!("changed the timestamps of {} files", changed);
      ExitCode::SUCCESS
    }
    Err(e) => {
      error!("{}", e);
      ExitCode::FAILURE
    }
  }
}

fn run_inspect(files: &[PathBuf]) -> ExitCode {
  let mut failed = false;
  for file in files {
    let mut decoder = match Decoder::open(file) {
      Ok(decoder) => decoder,
      Err(e) => {
        warn!("{}: {}", file.display(), e);
        failed = true;
        continue;
      }
    };

    println!("{}", file.display());
    for tag in DATE_TAKEN_TAGS {
      match decoder.find_datetime(tag) {
        Ok(Some(date)) => println!("  {:<18} {}", tag.to_string(), date),
        Ok(None) => {}
        Err(e) => warn!("{}: {}: {}", file.display(), tag, e),
      }
    }
    match decoder.thumbnail() {
      Ok(Some(thumbnail)) => println!("  {:<18} {} bytes", "Thumbnail", thumbnail.len()),
      Ok(None) => {}
      Err(e) => warn!("{}: thumbnail: {}", file.display(), e),
    }
  }

  if failed {
    ExitCode::FAILURE
  } else {
    ExitCode::SUCCESS
  }
}

fn init_logging(verbose: bool) {
  let env_filter = if verbose { "exif_dater=debug" } else { "exif_dater=info" };

  tracing_subscriber::registry()
    .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| env_filter.into()))
    .with(tracing_subscriber::fmt::layer())
    .init();
}
