//! All IO functionality needed for Exif decoding

use std::io::{self, Read, Seek};

/// Byte order of the TIFF structure inside the Exif block.
///
/// JPEG framing is always big endian; the TIFF header decides for everything
/// after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
  /// little endian byte order ("II")
  LittleEndian,
  /// big endian byte order ("MM")
  BigEndian,
}

/// Reader that is aware of the byte order.
pub trait EndianReader: Read {
  /// Byte order that should be adhered to
  fn byte_order(&self) -> ByteOrder;

  /// Reads an u8
  #[inline(always)]
  fn read_u8(&mut self) -> Result<u8, io::Error> {
    let mut n = [0u8; 1];
    self.read_exact(&mut n)?;
    Ok(n[0])
  }

  /// Reads an i8
  #[inline(always)]
  fn read_i8(&mut self) -> Result<i8, io::Error> {
    let mut n = [0u8; 1];
    self.read_exact(&mut n)?;
    Ok(i8::from_ne_bytes(n))
  }

  /// Reads an u16
  #[inline(always)]
  fn read_u16(&mut self) -> Result<u16, io::Error> {
    let mut n = [0u8; 2];
    self.read_exact(&mut n)?;
    Ok(match self.byte_order() {
      ByteOrder::LittleEndian => u16::from_le_bytes(n),
      ByteOrder::BigEndian => u16::from_be_bytes(n),
    })
  }

  /// Reads an i16
  #[inline(always)]
  fn read_i16(&mut self) -> Result<i16, io::Error> {
    let mut n = [0u8; 2];
    self.read_exact(&mut n)?;
    Ok(match self.byte_order() {
      ByteOrder::LittleEndian => i16::from_le_bytes(n),
      ByteOrder::BigEndian => i16::from_be_bytes(n),
    })
  }

  /// Reads an u32
  #[inline(always)]
  fn read_u32(&mut self) -> Result<u32, io::Error> {
    let mut n = [0u8; 4];
    self.read_exact(&mut n)?;
    Ok(match self.byte_order() {
      ByteOrder::LittleEndian => u32::from_le_bytes(n),
      ByteOrder::BigEndian => u32::from_be_bytes(n),
    })
  }

  /// Reads an i32
  #[inline(always)]
  fn read_i32(&mut self) -> Result<i32, io::Error> {
    let mut n = [0u8; 4];
    self.read_exact(&mut n)?;
    Ok(match self.byte_order() {
      ByteOrder::LittleEndian => i32::from_le_bytes(n),
      ByteOrder::BigEndian => i32::from_be_bytes(n),
    })
  }

  /// Reads an f32
  #[inline(always)]
  fn read_f32(&mut self) -> Result<f32, io::Error> {
    let mut n = [0u8; 4];
    self.read_exact(&mut n)?;
    Ok(f32::from_bits(match self.byte_order() {
      ByteOrder::LittleEndian => u32::from_le_bytes(n),
      ByteOrder::BigEndian => u32::from_be_bytes(n),
    }))
  }

  /// Reads an f64
  #[inline(always)]
  fn read_f64(&mut self) -> Result<f64, io::Error> {
    let mut n = [0u8; 8];
    self.read_exact(&mut n)?;
    Ok(f64::from_bits(match self.byte_order() {
      ByteOrder::LittleEndian => u64::from_le_bytes(n),
      ByteOrder::BigEndian => u64::from_be_bytes(n),
    }))
  }
}

/// Reader that is aware of the byte order.
#[derive(Debug)]
pub struct SmartReader<R> {
  reader: R,
  pub byte_order: ByteOrder,
}

impl<R> SmartReader<R>
where
  R: Read,
{
  /// Wraps a reader
  pub fn wrap(reader: R, byte_order: ByteOrder) -> SmartReader<R> {
    SmartReader { reader, byte_order }
  }

  pub fn into_inner(self) -> R {
    self.reader
  }
}

impl<R: Read + Seek> SmartReader<R> {
  pub fn goto_offset(&mut self, offset: u64) -> io::Result<()> {
    self.seek(io::SeekFrom::Start(offset)).map(|_| ())
  }

  pub fn skip(&mut self, bytes: i64) -> io::Result<()> {
    self.seek(io::SeekFrom::Current(bytes)).map(|_| ())
  }

  pub fn position(&mut self) -> io::Result<u64> {
    self.stream_position()
  }
}

impl<R> EndianReader for SmartReader<R>
where
  R: Read,
{
  #[inline(always)]
  fn byte_order(&self) -> ByteOrder {
    self.byte_order
  }
}

impl<R: Read> Read for SmartReader<R> {
  #[inline]
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.reader.read(buf)
  }
}

impl<R: Read + Seek> Seek for SmartReader<R> {
  #[inline]
  fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
    self.reader.seek(pos)
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;

  #[test]
  fn honours_byte_order() {
    let bytes = vec![0x01, 0x02, 0x03, 0x04];
    let mut le = SmartReader::wrap(Cursor::new(bytes.clone()), ByteOrder::LittleEndian);
    let mut be = SmartReader::wrap(Cursor::new(bytes), ByteOrder::BigEndian);
    assert_eq!(le.read_u32().unwrap(), 0x0403_0201);
    assert_eq!(be.read_u32().unwrap(), 0x0102_0304);
  }

  #[test]
  fn floats_are_reinterpreted_bits() {
    let mut le = SmartReader::wrap(Cursor::new(1.5f32.to_le_bytes().to_vec()), ByteOrder::LittleEndian);
    let mut be = SmartReader::wrap(Cursor::new((-2.25f64).to_be_bytes().to_vec()), ByteOrder::BigEndian);
    assert_eq!(le.read_f32().unwrap(), 1.5);
    assert_eq!(be.read_f64().unwrap(), -2.25);
  }

  #[test]
  fn order_can_change_mid_stream() {
    let mut r = SmartReader::wrap(Cursor::new(vec![0xff, 0xd8, 0x2a, 0x00]), ByteOrder::BigEndian);
    assert_eq!(r.read_u16().unwrap(), 0xffd8);
    r.byte_order = ByteOrder::LittleEndian;
    assert_eq!(r.read_u16().unwrap(), 0x002a);
    assert_eq!(r.position().unwrap(), 4);
  }
}
