use std::{error::Error, fmt, io, num::TryFromIntError};

use crate::{decoder::ifd::Value, tags::Tag};

/// Exif error kinds.
#[derive(Debug)]
pub enum ExifError {
  /// The stream is not a JPEG with a well-formed Exif block.
  FormatError(ExifFormatError),

  /// An I/O Error occurred while decoding.
  IoError(io::Error),

  /// The limits of the decoder were exceeded.
  LimitsExceeded,

  /// An integer conversion to or from a platform size failed, either due to
  /// limits of the platform size or limits of the format.
  IntSizeError,
}

/// The stream violates the JPEG/Exif structure.
///
/// This is fatal for the stream at hand; callers processing a batch of files
/// are expected to skip the file and carry on.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ExifFormatError {
  NotAJpeg,
  ExifBlockNotFound,
  InvalidSegmentLength(u16),
  ExifSignatureNotFound,
  ExifPaddingInvalid(u16),
  TiffSignatureInvalid(u16),
  ExifSubIfdNotFound,
  UnexpectedEof,
  TagNotAtExpectedOffset { expected: Tag, found: u16 },
  UnknownDataType(u16),
  RequiredTagNotFound(Tag),
  InvalidDateTime(String),
  ByteExpected(Value),
  UnsignedIntegerExpected(Value),
  SignedIntegerExpected(Value),
  NumberExpected(Value),
  AsciiExpected(Value),
}

impl fmt::Display for ExifFormatError {
  fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
    use self::ExifFormatError::*;
    match *self {
      NotAJpeg => write!(fmt, "File is not a valid JPEG."),
      ExifBlockNotFound => write!(fmt, "Exif block not found."),
      InvalidSegmentLength(len) => write!(fmt, "Invalid JPEG segment length {}.", len),
      ExifSignatureNotFound => write!(fmt, "Exif signature not found in APP1 segment."),
      ExifPaddingInvalid(pad) => write!(fmt, "Malformed Exif data: expected zero padding, found {:#06x}.", pad),
      TiffSignatureInvalid(magic) => write!(fmt, "TIFF signature invalid: {:#06x}.", magic),
      ExifSubIfdNotFound => write!(fmt, "Unable to locate the Exif sub-IFD."),
      UnexpectedEof => write!(fmt, "Unexpected end of stream."),
      TagNotAtExpectedOffset { expected, found } => {
        write!(fmt, "Tag number not at expected offset: expected {}, found {:#06x}.", expected, found)
      }
      UnknownDataType(t) => write!(fmt, "Unknown TIFF data type: {}.", t),
      RequiredTagNotFound(ref tag) => write!(fmt, "Required tag `{:?}` not found.", tag),
      InvalidDateTime(ref s) => write!(fmt, "Invalid date/time string {:?}.", s),
      ByteExpected(ref val) => write!(fmt, "Expected byte, {:?} found.", val),
      UnsignedIntegerExpected(ref val) => {
        write!(fmt, "Expected unsigned integer, {:?} found.", val)
      }
      SignedIntegerExpected(ref val) => write!(fmt, "Expected signed integer, {:?} found.", val),
      NumberExpected(ref val) => write!(fmt, "Expected numeric value, {:?} found.", val),
      AsciiExpected(ref val) => write!(fmt, "Expected ASCII string, {:?} found.", val),
    }
  }
}

impl fmt::Display for ExifError {
  fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      ExifError::FormatError(ref e) => write!(fmt, "Format error: {}", e),
      ExifError::IoError(ref e) => e.fmt(fmt),
      ExifError::LimitsExceeded => write!(fmt, "The Decoder limits are exceeded"),
      ExifError::IntSizeError => write!(fmt, "Platform or format size limits exceeded"),
    }
  }
}

impl Error for ExifError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match *self {
      ExifError::IoError(ref e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ExifError {
  fn from(err: io::Error) -> ExifError {
    match err.kind() {
      io::ErrorKind::UnexpectedEof => ExifError::FormatError(ExifFormatError::UnexpectedEof),
      _ => ExifError::IoError(err),
    }
  }
}

impl From<ExifFormatError> for ExifError {
  fn from(err: ExifFormatError) -> ExifError {
    ExifError::FormatError(err)
  }
}

impl From<TryFromIntError> for ExifError {
  fn from(_err: TryFromIntError) -> ExifError {
    ExifError::IntSizeError
  }
}

/// Result of an Exif decoding process
pub type ExifResult<T> = Result<T, ExifError>;

#[cfg(test)]
mod tests {
  use std::io;

  use super::*;

  #[test]
  fn eof_is_a_format_error() {
    let err = ExifError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "short read"));
    assert!(matches!(err, ExifError::FormatError(ExifFormatError::UnexpectedEof)));
  }

  #[test]
  fn other_io_errors_stay_io_errors() {
    let err = ExifError::from(io::Error::new(io::ErrorKind::PermissionDenied, "nope"));
    assert!(matches!(err, ExifError::IoError(_)));
  }

  #[test]
  fn tag_mismatch_message_names_both_sides() {
    let err = ExifFormatError::TagNotAtExpectedOffset { expected: Tag::DateTime, found: 0x9003 };
    assert_eq!(
      err.to_string(),
      "Tag number not at expected offset: expected DateTime, found 0x9003."
    );
  }
}
