use std::{
  collections::HashMap,
  convert::TryFrom,
  fs::File,
  io::{BufReader, Read, Seek},
  path::Path,
};

use chrono::NaiveDateTime;
use log::debug;

use self::{
  ifd::{Catalogue, Value},
  stream::{ByteOrder, EndianReader, SmartReader},
  tag_reader::TagReader,
};
use crate::{
  tags::{Tag, COMPRESSION_JPEG},
  ExifError, ExifFormatError, ExifResult,
};

pub mod ifd;
mod jpeg;
pub mod stream;
mod tag_reader;

pub use self::jpeg::{EOI, SOI};

const EXIF_SIGNATURE: &[u8; 4] = b"Exif";
const TIFF_MAGIC: u16 = 0x002a;

/// Tags consulted by [`Decoder::date_taken`], most trusted first.
///
/// Blank or absent tags are passed over. A tag holding an unparsable date
/// ends the search with `InvalidDateTime`, so a damaged file is reported
/// rather than dated by a less trusted tag.
pub const DATE_TAKEN_TAGS: [Tag; 4] =
  [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime, Tag::GpsDateStamp];

/// Decoding limits
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Limits {
  /// The maximum size of any tag value in bytes, the default is
  /// 1MiB.
  pub ifd_value_size: usize,
  /// The maximum size of an embedded thumbnail in bytes, the default is
  /// 64KiB, which is all an APP1 segment can hold.
  pub thumbnail_size: usize,
}

impl Limits {
  /// A configuration that does not impose any limits.
  ///
  /// This is a good start if the caller only wants to impose selective limits, contrary to the
  /// default limits which allows selectively disabling limits.
  pub fn unlimited() -> Limits {
    Limits { ifd_value_size: usize::MAX, thumbnail_size: usize::MAX }
  }
}

impl Default for Limits {
  fn default() -> Limits {
    Limits { ifd_value_size: 1024 * 1024, thumbnail_size: 64 * 1024 }
  }
}

/// Exif reader for a JPEG stream.
///
/// Construction validates the JPEG framing and the TIFF header and records
/// where each tag entry lives. Values are only read when asked for, so the
/// stream stays owned by the decoder for its whole lifetime.
#[derive(Debug)]
pub struct Decoder<R> {
  reader: SmartReader<R>,
  limits: Limits,
  tiff_start: u64,
  main: Catalogue,
  thumbnail: Option<Catalogue>,
}

impl Decoder<BufReader<File>> {
  /// Opens the file at `path` and reads its Exif structure.
  pub fn open<P: AsRef<Path>>(path: P) -> ExifResult<Self> {
    Decoder::new(BufReader::new(File::open(path)?))
  }
}

impl<R> Decoder<R> {
  /// Returns the byte_order
  pub fn byte_order(&self) -> ByteOrder {
    self.reader.byte_order
  }

  /// Absolute stream position of the TIFF header. All Exif offsets are relative to it.
  pub fn tiff_header_start(&self) -> u64 {
    self.tiff_start
  }

  /// Whether `tag` is present in the main, Exif or GPS directories.
  pub fn contains(&self, tag: Tag) -> bool {
    self.main.contains_key(&tag)
  }

  /// Tags of the main, Exif and GPS directories, in id order.
  pub fn tags(&self) -> Vec<Tag> {
    sorted_tags(&self.main)
  }

  /// Tags of the thumbnail directory, in id order. Empty without one.
  pub fn thumbnail_tags(&self) -> Vec<Tag> {
    self.thumbnail.as_ref().map(sorted_tags).unwrap_or_default()
  }

  /// Releases the underlying stream.
  pub fn into_inner(self) -> R
  where
    R: Read,
  {
    self.reader.into_inner()
  }
}

fn sorted_tags(catalogue: &Catalogue) -> Vec<Tag> {
  let mut tags: Vec<Tag> = catalogue.keys().copied().collect();
  tags.sort_by_key(Tag::to_u16);
  tags
}

impl<R: Read + Seek> Decoder<R> {
  /// Create a new decoder that decodes from the stream ```r```
  ///
  /// The stream is dropped together with the error if it does not hold a
  /// readable Exif block.
  pub fn new(r: R) -> ExifResult<Decoder<R>> {
    // JPEG framing is big endian; the TIFF header picks the order after that.
    let mut reader = SmartReader::wrap(r, ByteOrder::BigEndian);

    jpeg::read_soi(&mut reader)?;
    jpeg::seek_to_app1(&mut reader)?;
    let tiff_start = Self::read_exif_header(&mut reader)?;
    let first_ifd = Self::read_tiff_header(&mut reader)?;

    let mut decoder =
      Decoder { reader, limits: Limits::default(), tiff_start, main: HashMap::new(), thumbnail: None };
    decoder.build_catalogues(first_ifd)?;
    Ok(decoder)
  }

  pub fn with_limits(mut self, limits: Limits) -> Decoder<R> {
    self.limits = limits;
    self
  }

  // APP1 length, "Exif", two zero bytes. Returns the position of the TIFF header.
  fn read_exif_header(reader: &mut SmartReader<R>) -> ExifResult<u64> {
    reader.read_u16()?;

    let mut signature = [0; 4];
    reader.read_exact(&mut signature)?;
    if &signature != EXIF_SIGNATURE {
      return Err(ExifFormatError::ExifSignatureNotFound.into());
    }

    let padding = reader.read_u16()?;
    if padding != 0 {
      return Err(ExifFormatError::ExifPaddingInvalid(padding).into());
    }

    Ok(reader.position()?)
  }

  // Byte order mark, magic number, offset of the first IFD.
  fn read_tiff_header(reader: &mut SmartReader<R>) -> ExifResult<u32> {
    let mut order = [0; 2];
    reader.read_exact(&mut order)?;
    reader.byte_order = match &order {
      b"II" => ByteOrder::LittleEndian,
      _ => ByteOrder::BigEndian,
    };

    let magic = reader.read_u16()?;
    if magic != TIFF_MAGIC {
      return Err(ExifFormatError::TiffSignatureInvalid(magic).into());
    }

    Ok(reader.read_u32()?)
  }

  fn build_catalogues(&mut self, first_ifd: u32) -> ExifResult<()> {
    let mut main = Catalogue::new();

    self.reader.goto_offset(self.tiff_start + u64::from(first_ifd))?;
    Self::catalogue_ifd(&mut self.reader, &mut main)?;
    // The offset of IFD1, the thumbnail directory, directly follows IFD0.
    let thumbnail_ifd = self.reader.read_u32()?;

    let exif_ifd = self
      .tag_reader(&main)
      .find_tag_unsigned::<u32>(Tag::ExifIfdPointer)?
      .ok_or(ExifFormatError::ExifSubIfdNotFound)?;
    self.reader.goto_offset(self.tiff_start + u64::from(exif_ifd))?;
    Self::catalogue_ifd(&mut self.reader, &mut main)?;

    if let Some(gps_ifd) = self.tag_reader(&main).find_tag_unsigned::<u32>(Tag::GpsIfdPointer)? {
      self.reader.goto_offset(self.tiff_start + u64::from(gps_ifd))?;
      Self::catalogue_ifd(&mut self.reader, &mut main)?;
    }

    if thumbnail_ifd != 0 {
      let mut thumbnail = Catalogue::new();
      self.reader.goto_offset(self.tiff_start + u64::from(thumbnail_ifd))?;
      Self::catalogue_ifd(&mut self.reader, &mut thumbnail)?;
      debug!("catalogued {} thumbnail tags", thumbnail.len());
      self.thumbnail = Some(thumbnail);
    }

    debug!("catalogued {} tags", main.len());
    self.main = main;
    Ok(())
  }

  /// Records the entry offsets of the IFD at the current position.
  // Entries are 12 bytes: the tag id is read, the remaining 10 bytes skipped.
  fn catalogue_ifd(reader: &mut SmartReader<R>, catalogue: &mut Catalogue) -> ExifResult<()> {
    let num_tags = reader.read_u16()?;
    for _ in 0..num_tags {
      let entry_start = reader.position()?;
      let tag = Tag::from_u16_exhaustive(reader.read_u16()?);
      catalogue.insert(tag, entry_start);
      reader.skip(10)?;
    }
    Ok(())
  }

  fn tag_reader<'a>(&'a mut self, catalogue: &'a Catalogue) -> TagReader<'a, R> {
    TagReader {
      reader: &mut self.reader,
      catalogue,
      limits: &self.limits,
      tiff_start: self.tiff_start,
    }
  }

  fn main_tags(&mut self) -> TagReader<'_, R> {
    TagReader {
      reader: &mut self.reader,
      catalogue: &self.main,
      limits: &self.limits,
      tiff_start: self.tiff_start,
    }
  }

  /// Tries to retrieve a tag.
  /// Return `Ok(None)` if the tag is not present.
  pub fn find_tag(&mut self, tag: Tag) -> ExifResult<Option<Value>> {
    self.main_tags().find_tag(tag)
  }

  /// Tries to retrieve a tag.
  /// Returns an error if the tag is not present
  pub fn get_tag(&mut self, tag: Tag) -> ExifResult<Value> {
    self.main_tags().require_tag(tag)
  }

  /// Tries to retrieve a tag and convert it to the desired unsigned type.
  pub fn find_tag_unsigned<T: TryFrom<u32>>(&mut self, tag: Tag) -> ExifResult<Option<T>> {
    self.main_tags().find_tag_unsigned(tag)
  }

  /// Tries to retrieve a numeric tag as a float. Rationals are divided out.
  pub fn find_tag_f64(&mut self, tag: Tag) -> ExifResult<Option<f64>> {
    self.find_tag(tag)?.map(Value::into_f64).transpose()
  }

  /// Tries to retrieve an ASCII tag.
  pub fn find_string(&mut self, tag: Tag) -> ExifResult<Option<String>> {
    self.find_tag(tag)?.map(Value::into_string).transpose()
  }

  /// Tries to retrieve a date tag.
  ///
  /// `Ok(None)` if the tag is absent or holds the blank "unknown date"
  /// placeholder.
  pub fn find_datetime(&mut self, tag: Tag) -> ExifResult<Option<NaiveDateTime>> {
    Ok(self.find_tag(tag)?.map(Value::into_datetime).transpose()?.flatten())
  }

  /// The capture date, from the first of [`DATE_TAKEN_TAGS`] that holds one.
  ///
  /// Fails on the first tag whose date cannot be parsed.
  pub fn date_taken(&mut self) -> ExifResult<Option<NaiveDateTime>> {
    for tag in DATE_TAKEN_TAGS {
      if let Some(date) = self.find_datetime(tag)? {
        return Ok(Some(date));
      }
    }
    Ok(None)
  }

  /// Returns the embedded JPEG thumbnail, if there is a well-formed one.
  pub fn thumbnail(&mut self) -> ExifResult<Option<Vec<u8>>> {
    let catalogue = match self.thumbnail.take() {
      Some(catalogue) => catalogue,
      None => return Ok(None),
    };
    let result = self.read_thumbnail(&catalogue);
    self.thumbnail = Some(catalogue);
    result
  }

  fn read_thumbnail(&mut self, catalogue: &Catalogue) -> ExifResult<Option<Vec<u8>>> {
    let mut tags = self.tag_reader(catalogue);

    // Anything but a JPEG compression value, however it is stored, means no thumbnail.
    match tags.find_tag(Tag::Compression)?.map(Value::into_u32) {
      Some(Ok(compression)) if compression == u32::from(COMPRESSION_JPEG) => {}
      _ => return Ok(None),
    }
    let offset = match tags.find_tag_unsigned::<u32>(Tag::JpegInterchangeFormat)? {
      Some(offset) => offset,
      None => return Ok(None),
    };
    let len = match tags.find_tag_unsigned::<usize>(Tag::JpegInterchangeFormatLength)? {
      Some(len) => len,
      None => return Ok(None),
    };
    if len > self.limits.thumbnail_size {
      return Err(ExifError::LimitsExceeded);
    }

    jpeg::read_embedded_jpeg(&mut self.reader, self.tiff_start + u64::from(offset), len)
  }
}
