//! Capture dates from JPEG Exif metadata, and photo folders named after them
//!
//! The [`decoder`] reads the Exif block of a JPEG straight from a seekable
//! stream, without decoding the image: it validates the JPEG framing, parses
//! the TIFF header and catalogues the entries of the main, Exif, GPS and
//! thumbnail directories. Tag values are read lazily on lookup.
//!
//! The [`folder`] module builds on it to derive a date per photo folder and to
//! rename folders or rewrite file timestamps accordingly.
//!
//! ```no_run
//! use exif_dater::{decoder::Decoder, tags::Tag};
//!
//! let mut decoder = Decoder::open("IMG_0001.JPG")?;
//! if let Some(taken) = decoder.find_datetime(Tag::DateTimeOriginal)? {
//!   println!("taken on {taken}");
//! }
//! # Ok::<(), exif_dater::ExifError>(())
//! ```
//!
//! # Related Links
//! * <https://www.cipa.jp/std/documents/e/DC-008-2012_E.pdf> - The Exif 2.3 specification
//! * <https://web.archive.org/web/20210108073850/https://www.adobe.io/open/standards/TIFF.html> -
//!   The TIFF specification

pub use self::error::{ExifError, ExifFormatError, ExifResult};

pub mod date;
pub mod decoder;
mod error;
pub mod folder;
pub mod rational;
pub mod tags;
