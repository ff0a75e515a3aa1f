use std::{
  convert::TryFrom,
  io::{Read, Seek},
};

use super::{
  ifd::{Catalogue, Entry, Value},
  stream::SmartReader,
  Limits,
};
use crate::{tags::Tag, ExifError, ExifFormatError, ExifResult};

/// Resolves tag values of one catalogue against the stream.
pub(crate) struct TagReader<'a, R: Read + Seek> {
  pub reader: &'a mut SmartReader<R>,
  pub catalogue: &'a Catalogue,
  pub limits: &'a Limits,
  pub tiff_start: u64,
}

impl<'a, R: Read + Seek> TagReader<'a, R> {
  /// Re-reads the entry behind `tag`. `Ok(None)` if it was never catalogued.
  pub(crate) fn find_entry(&mut self, tag: Tag) -> ExifResult<Option<Entry>> {
    let offset = match self.catalogue.get(&tag) {
      Some(offset) => *offset,
      None => return Ok(None),
    };
    self.reader.goto_offset(offset)?;
    Ok(Some(Entry::read(self.reader, tag)?))
  }

  pub(crate) fn find_tag(&mut self, tag: Tag) -> ExifResult<Option<Value>> {
    Ok(match self.find_entry(tag)? {
      Some(entry) => Some(entry.val(self.limits, self.tiff_start, self.reader)?),
      None => None,
    })
  }

  pub(crate) fn require_tag(&mut self, tag: Tag) -> ExifResult<Value> {
    match self.find_tag(tag)? {
      Some(val) => Ok(val),
      None => Err(ExifError::FormatError(ExifFormatError::RequiredTagNotFound(tag))),
    }
  }

  pub(crate) fn find_tag_unsigned<T: TryFrom<u32>>(&mut self, tag: Tag) -> ExifResult<Option<T>> {
    self
      .find_tag(tag)?
      .map(Value::into_u32)
      .transpose()?
      .map(|value| T::try_from(value).map_err(|_| ExifError::IntSizeError))
      .transpose()
  }
}
