//! JPEG framing around the Exif block.
//
// A JPEG is a sequence of segments:
//
// 0xFF      1 byte
// Marker    1 byte
// Length    2 bytes, big endian, counting itself
// Payload   Length - 2 bytes
//
// Exif lives in the APP1 segment.

use std::io::{self, Read, Seek};

use log::trace;

use super::stream::{EndianReader, SmartReader};
use crate::{ExifError, ExifFormatError, ExifResult};

/// Start of image
pub const SOI: [u8; 2] = [0xff, 0xd8];
/// End of image
pub const EOI: [u8; 2] = [0xff, 0xd9];

const MARKER_PREFIX: u8 = 0xff;
const APP1: u8 = 0xe1;
const SOS: u8 = 0xda;
const EOI_MARKER: u8 = 0xd9;

/// Checks the start-of-image marker at the current position.
pub(crate) fn read_soi<R: Read>(reader: &mut SmartReader<R>) -> ExifResult<()> {
  let mut marker = [0; 2];
  match reader.read_exact(&mut marker) {
    Ok(()) if marker == SOI => Ok(()),
    Ok(()) => Err(ExifFormatError::NotAJpeg.into()),
    Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(ExifFormatError::NotAJpeg.into()),
    Err(e) => Err(e.into()),
  }
}

/// Skips segments until the reader sits just past an APP1 marker.
pub(crate) fn seek_to_app1<R: Read + Seek>(reader: &mut SmartReader<R>) -> ExifResult<()> {
  loop {
    let prefix = read_marker_byte(reader)?;
    if prefix != MARKER_PREFIX {
      return Err(ExifFormatError::ExifBlockNotFound.into());
    }
    let marker = read_marker_byte(reader)?;
    match marker {
      APP1 => return Ok(()),
      // Entropy coded data or the end of the image follows; no more metadata.
      SOS | EOI_MARKER => return Err(ExifFormatError::ExifBlockNotFound.into()),
      _ => {}
    }
    let len = reader.read_u16().map_err(block_not_found)?;
    if len < 2 {
      return Err(ExifFormatError::InvalidSegmentLength(len).into());
    }
    trace!("skipping JPEG segment {:#04x} of {} bytes", marker, len);
    reader.skip(i64::from(len) - 2)?;
  }
}

fn read_marker_byte<R: Read>(reader: &mut SmartReader<R>) -> ExifResult<u8> {
  reader.read_u8().map_err(block_not_found)
}

fn block_not_found(e: io::Error) -> ExifError {
  match e.kind() {
    io::ErrorKind::UnexpectedEof => ExifFormatError::ExifBlockNotFound.into(),
    _ => e.into(),
  }
}

/// Reads an embedded JPEG of `len` bytes starting at or after `offset`.
///
/// Leading padding before the start-of-image marker is skipped, searching at
/// most `len` bytes. Returns `None` if no marker is found, the data is cut
/// short, or it does not end with the end-of-image marker.
pub(crate) fn read_embedded_jpeg<R: Read + Seek>(
  reader: &mut SmartReader<R>, offset: u64, len: usize,
) -> ExifResult<Option<Vec<u8>>> {
  reader.goto_offset(offset)?;

  let mut previous = None;
  let mut found = false;
  for _ in 0..len {
    let byte = match reader.read_u8() {
      Ok(b) => b,
      Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
      Err(e) => return Err(e.into()),
    };
    if previous == Some(SOI[0]) && byte == SOI[1] {
      found = true;
      break;
    }
    previous = Some(byte);
  }
  if !found {
    return Ok(None);
  }

  reader.skip(-2)?;
  let mut data = vec![0; len];
  match reader.read_exact(&mut data) {
    Ok(()) => {}
    Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
    Err(e) => return Err(e.into()),
  }

  if data.len() < 2 || data[data.len() - 2..] != EOI {
    return Ok(None);
  }
  Ok(Some(data))
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;
  use crate::decoder::stream::ByteOrder;

  fn reader(bytes: Vec<u8>) -> SmartReader<Cursor<Vec<u8>>> {
    SmartReader::wrap(Cursor::new(bytes), ByteOrder::BigEndian)
  }

  #[test]
  fn skips_unrelated_segments() {
    // SOI, APP0 with 3 payload bytes, APP1
    let mut r = reader(vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x05, 1, 2, 3, 0xff, 0xe1, 0x00, 0x08]);
    read_soi(&mut r).unwrap();
    seek_to_app1(&mut r).unwrap();
    assert_eq!(r.position().unwrap(), 11);
  }

  #[test]
  fn stray_byte_instead_of_marker() {
    let mut r = reader(vec![0xff, 0xd8, 0x00, 0xe1]);
    read_soi(&mut r).unwrap();
    assert!(matches!(
      seek_to_app1(&mut r),
      Err(ExifError::FormatError(ExifFormatError::ExifBlockNotFound))
    ));
  }

  #[test]
  fn end_of_stream_before_app1() {
    let mut r = reader(vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, 1, 2]);
    read_soi(&mut r).unwrap();
    assert!(matches!(
      seek_to_app1(&mut r),
      Err(ExifError::FormatError(ExifFormatError::ExifBlockNotFound))
    ));
  }

  #[test]
  fn segment_length_below_two() {
    let mut r = reader(vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x01, 0xff, 0xe1]);
    read_soi(&mut r).unwrap();
    assert!(matches!(
      seek_to_app1(&mut r),
      Err(ExifError::FormatError(ExifFormatError::InvalidSegmentLength(1)))
    ));
  }

  #[test]
  fn short_stream_is_not_a_jpeg() {
    let mut r = reader(vec![0xff]);
    assert!(matches!(read_soi(&mut r), Err(ExifError::FormatError(ExifFormatError::NotAJpeg))));
  }

  #[test]
  fn embedded_jpeg_skips_padding() {
    let mut bytes = vec![0u8; 4];
    bytes.extend_from_slice(&[0x00, 0x00, 0xff, 0xd8, 0x42, 0xff, 0xd9]);
    let mut r = reader(bytes);
    let thumb = read_embedded_jpeg(&mut r, 4, 5).unwrap().unwrap();
    assert_eq!(thumb, vec![0xff, 0xd8, 0x42, 0xff, 0xd9]);
  }

  #[test]
  fn embedded_jpeg_without_eoi() {
    let mut r = reader(vec![0xff, 0xd8, 0x42, 0x43, 0x44]);
    assert_eq!(read_embedded_jpeg(&mut r, 0, 5).unwrap(), None);
  }
}
