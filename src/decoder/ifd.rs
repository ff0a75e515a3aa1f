//! Function for reading Exif tags

use std::{
  collections::HashMap,
  convert::TryFrom,
  io::{self, Read, Seek},
};

use chrono::NaiveDateTime;

use self::Value::{
  Ascii, Byte, Bytes, Double, Float, List, Rational, SRational, Short, Signed, SignedByte,
  SignedShort, Unsigned,
};
use super::{
  stream::{ByteOrder, EndianReader, SmartReader},
  Limits,
};
use crate::{date, rational, tags::Tag, tags::Type, ExifError, ExifFormatError, ExifResult};

/// Tag id to the absolute stream offset of its 12 byte IFD entry.
///
/// Values are not read while cataloguing; they are resolved on lookup.
pub type Catalogue = HashMap<Tag, u64>;

/// A decoded tag value.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
  Byte(u8),
  SignedByte(i8),
  Short(u16),
  SignedShort(i16),
  Unsigned(u32),
  Signed(i32),
  Rational(rational::Rational),
  SRational(rational::SRational),
  Float(f32),
  Double(f64),
  Ascii(String),
  /// Multiple `BYTE` or `UNDEFINED` components, kept raw.
  Bytes(Vec<u8>),
  List(Vec<Value>),
}

impl Value {
  pub fn into_u8(self) -> ExifResult<u8> {
    match self {
      Byte(val) => Ok(val),
      val => Err(ExifError::FormatError(ExifFormatError::ByteExpected(val))),
    }
  }

  pub fn into_u16(self) -> ExifResult<u16> {
    match self {
      Byte(val) => Ok(val.into()),
      Short(val) => Ok(val),
      Unsigned(val) => Ok(u16::try_from(val)?),
      val => Err(ExifError::FormatError(ExifFormatError::UnsignedIntegerExpected(val))),
    }
  }

  pub fn into_u32(self) -> ExifResult<u32> {
    match self {
      Byte(val) => Ok(val.into()),
      Short(val) => Ok(val.into()),
      Unsigned(val) => Ok(val),
      val => Err(ExifError::FormatError(ExifFormatError::UnsignedIntegerExpected(val))),
    }
  }

  pub fn into_i32(self) -> ExifResult<i32> {
    match self {
      SignedByte(val) => Ok(val.into()),
      SignedShort(val) => Ok(val.into()),
      Signed(val) => Ok(val),
      Byte(val) => Ok(val.into()),
      Short(val) => Ok(val.into()),
      Unsigned(val) => Ok(i32::try_from(val)?),
      val => Err(ExifError::FormatError(ExifFormatError::SignedIntegerExpected(val))),
    }
  }

  /// Any scalar number as a float. Rationals with a zero denominator give `0.0`.
  pub fn into_f64(self) -> ExifResult<f64> {
    match self {
      Rational(r) => Ok(r.to_f64()),
      SRational(r) => Ok(r.to_f64()),
      Float(val) => Ok(val.into()),
      Double(val) => Ok(val),
      Byte(val) => Ok(val.into()),
      SignedByte(val) => Ok(val.into()),
      Short(val) => Ok(val.into()),
      SignedShort(val) => Ok(val.into()),
      Unsigned(val) => Ok(val.into()),
      Signed(val) => Ok(val.into()),
      val => Err(ExifError::FormatError(ExifFormatError::NumberExpected(val))),
    }
  }

  pub fn into_string(self) -> ExifResult<String> {
    match self {
      Ascii(val) => Ok(val),
      val => Err(ExifError::FormatError(ExifFormatError::AsciiExpected(val))),
    }
  }

  pub fn into_bytes(self) -> ExifResult<Vec<u8>> {
    match self {
      Bytes(val) => Ok(val),
      Byte(val) => Ok(vec![val]),
      val => Err(ExifError::FormatError(ExifFormatError::ByteExpected(val))),
    }
  }

  pub fn into_u32_vec(self) -> ExifResult<Vec<u32>> {
    match self {
      List(vec) => vec.into_iter().map(Value::into_u32).collect(),
      Bytes(vec) => Ok(vec.into_iter().map(u32::from).collect()),
      val => Ok(vec![val.into_u32()?]),
    }
  }

  pub fn into_f64_vec(self) -> ExifResult<Vec<f64>> {
    match self {
      List(vec) => vec.into_iter().map(Value::into_f64).collect(),
      val => Ok(vec![val.into_f64()?]),
    }
  }

  /// Interprets an ASCII value as an Exif date. Blank placeholders give `None`.
  pub fn into_datetime(self) -> ExifResult<Option<NaiveDateTime>> {
    date::parse_datetime(&self.into_string()?)
  }
}

/// A raw IFD entry as found in the stream.
// An IFD entry has four fields:
//
// Tag   2 bytes
// Type  2 bytes
// Count 4 bytes
// Value 4 bytes either a pointer the value itself
#[derive(Clone)]
pub struct Entry {
  tag: Tag,
  type_: Type,
  count: u32,
  offset: [u8; 4],
}

impl ::std::fmt::Debug for Entry {
  fn fmt(&self, fmt: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
    fmt.write_str(&format!(
      "Entry {{ tag: {}, type_: {:?}, count: {:?}, offset: {:?} }}",
      self.tag, self.type_, self.count, &self.offset
    ))
  }
}

impl Entry {
  pub fn new(tag: Tag, type_: Type, count: u32, offset: [u8; 4]) -> Entry {
    Entry { tag, type_, count, offset }
  }

  /// Reads the entry at the current position, checking it carries `expected`.
  pub fn read<R: Read>(reader: &mut SmartReader<R>, expected: Tag) -> ExifResult<Entry> {
    let found = reader.read_u16()?;
    if found != expected.to_u16() {
      return Err(ExifFormatError::TagNotAtExpectedOffset { expected, found }.into());
    }
    let raw_type = reader.read_u16()?;
    let type_ = Type::from_u16(raw_type).ok_or(ExifFormatError::UnknownDataType(raw_type))?;
    let count = reader.read_u32()?;
    let mut offset = [0; 4];
    reader.read_exact(&mut offset)?;
    Ok(Entry::new(expected, type_, count, offset))
  }

  /// Byte length of the whole value.
  pub fn value_len(&self) -> ExifResult<usize> {
    usize::try_from(self.count)?.checked_mul(self.type_.size()).ok_or(ExifError::LimitsExceeded)
  }

  /// Returns a mem_reader for the offset/value field
  fn r(&self, byte_order: ByteOrder) -> SmartReader<io::Cursor<Vec<u8>>> {
    SmartReader::wrap(io::Cursor::new(self.offset.to_vec()), byte_order)
  }

  /// Raw value bytes, inline or from `tiff_start + offset`.
  pub fn data<R: Read + Seek>(
    &self, limits: &Limits, tiff_start: u64, reader: &mut SmartReader<R>,
  ) -> ExifResult<Vec<u8>> {
    let len = self.value_len()?;
    if len > limits.ifd_value_size {
      return Err(ExifError::LimitsExceeded);
    }

    if len <= 4 {
      return Ok(self.offset[..len].to_vec());
    }

    let offset = self.r(reader.byte_order).read_u32()?;
    reader.goto_offset(tiff_start + u64::from(offset))?;
    let mut data = vec![0; len];
    reader.read_exact(&mut data)?;
    Ok(data)
  }

  pub fn val<R: Read + Seek>(
    &self, limits: &Limits, tiff_start: u64, reader: &mut SmartReader<R>,
  ) -> ExifResult<Value> {
    let data = self.data(limits, tiff_start, reader)?;
    decode(self.type_, self.count, data, reader.byte_order)
  }
}

fn decode(type_: Type, count: u32, data: Vec<u8>, byte_order: ByteOrder) -> ExifResult<Value> {
  match type_ {
    Type::BYTE | Type::UNDEFINED => {
      if count == 1 {
        Ok(Byte(data[0]))
      } else {
        Ok(Bytes(data))
      }
    }
    Type::ASCII => {
      let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
      Ok(Ascii(String::from_utf8_lossy(&data[..end]).into_owned()))
    }
    _ => {
      let mut r = SmartReader::wrap(io::Cursor::new(data), byte_order);
      let mut next = || -> io::Result<Value> {
        Ok(match type_ {
          Type::SBYTE => SignedByte(r.read_i8()?),
          Type::SHORT => Short(r.read_u16()?),
          Type::SSHORT => SignedShort(r.read_i16()?),
          Type::LONG => Unsigned(r.read_u32()?),
          Type::SLONG => Signed(r.read_i32()?),
          Type::RATIONAL => Rational(rational::Rational::new(r.read_u32()?, r.read_u32()?)),
          Type::SRATIONAL => SRational(rational::SRational::new(r.read_i32()?, r.read_i32()?)),
          Type::FLOAT => Float(r.read_f32()?),
          Type::DOUBLE => Double(r.read_f64()?),
          Type::BYTE | Type::UNDEFINED | Type::ASCII => unreachable!("handled above"),
        })
      };

      if count == 1 {
        Ok(next()?)
      } else {
        let mut v = Vec::with_capacity(count as usize);
        for _ in 0..count {
          v.push(next()?);
        }
        Ok(List(v))
      }
    }
  }
}
