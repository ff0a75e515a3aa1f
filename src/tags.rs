macro_rules! tags {
  {
    // Permit arbitrary meta items, which include documentation.
    $( #[$enum_attr:meta] )*
    $vis:vis enum $name:ident($ty:tt) $(unknown($unknown_doc:literal))* {
      // Each of the `Name = Val,` permitting documentation.
      $($(#[$ident_attr:meta])* $tag:ident = $val:expr,)*
    }
  } => {
    $( #[$enum_attr] )*
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    #[non_exhaustive]
    pub enum $name {
      $($(#[$ident_attr])* $tag,)*
      $(
        #[doc = $unknown_doc]
        Unknown($ty),
      )*
    }

    impl $name {
      #[inline(always)]
      fn __from_inner_type(n: $ty) -> Result<Self, $ty> {
        match n {
          $( $val => Ok($name::$tag), )*
          n => Err(n),
        }
      }

      #[inline(always)]
      fn __to_inner_type(&self) -> $ty {
        match *self {
          $( $name::$tag => $val, )*
          $( $name::Unknown(n) => { $unknown_doc; n }, )*
        }
      }
    }

    impl std::fmt::Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
          $( $name::$tag => write!(f, stringify!($tag)), )*
          $( $name::Unknown(n) => { $unknown_doc; write!(f, "{n:#06x}") }, )*
        }
      }
    }

    impl $name {
      #[inline(always)]
      pub fn from_u16(val: u16) -> Option<Self> {
        Self::__from_inner_type(val).ok()
      }

      $(
      #[inline(always)]
      pub fn from_u16_exhaustive(val: u16) -> Self {
        $unknown_doc;
        Self::__from_inner_type(val).unwrap_or_else(|_| $name::Unknown(val))
      }
      )*

      #[inline(always)]
      pub fn to_u16(&self) -> u16 {
        Self::__to_inner_type(self)
      }
    }

    $(
    impl From<u16> for $name {
      fn from(raw: u16) -> Self {
        $unknown_doc;
        <$name>::from_u16_exhaustive(raw)
      }
    }
    )*
  };
}

// The main IFD is merged with the Exif and GPS sub-IFDs into one catalogue.
// GPS ids live below 0x0100 and never collide with IFD0 or Exif ids.
tags! {
/// Exif tags
pub enum Tag(u16) unknown("A private, maker or otherwise unlisted tag") {
  // GPS sub-IFD
  GpsVersionId = 0x0000,
  GpsLatitudeRef = 0x0001,
  GpsLatitude = 0x0002,
  GpsLongitudeRef = 0x0003,
  GpsLongitude = 0x0004,
  GpsAltitudeRef = 0x0005,
  GpsAltitude = 0x0006,
  GpsTimeStamp = 0x0007,
  GpsMapDatum = 0x0012,
  GpsDateStamp = 0x001d,
  // IFD0 / IFD1
  ImageWidth = 0x0100,
  ImageLength = 0x0101,
  BitsPerSample = 0x0102,
  Compression = 0x0103,
  PhotometricInterpretation = 0x0106,
  ImageDescription = 0x010e,
  Make = 0x010f,
  Model = 0x0110,
  Orientation = 0x0112,
  SamplesPerPixel = 0x0115,
  XResolution = 0x011a,
  YResolution = 0x011b,
  ResolutionUnit = 0x0128,
  Software = 0x0131,
  DateTime = 0x0132,
  Artist = 0x013b,
  /// Offset of the JPEG thumbnail, relative to the TIFF header
  JpegInterchangeFormat = 0x0201,
  /// Length in bytes of the JPEG thumbnail
  JpegInterchangeFormatLength = 0x0202,
  YCbCrPositioning = 0x0213,
  Copyright = 0x8298,
  /// Offset of the Exif sub-IFD
  ExifIfdPointer = 0x8769,
  /// Offset of the GPS sub-IFD
  GpsIfdPointer = 0x8825,
  // Exif sub-IFD
  ExposureTime = 0x829a,
  FNumber = 0x829d,
  ExposureProgram = 0x8822,
  IsoSpeedRatings = 0x8827,
  ExifVersion = 0x9000,
  DateTimeOriginal = 0x9003,
  DateTimeDigitized = 0x9004,
  ComponentsConfiguration = 0x9101,
  ShutterSpeedValue = 0x9201,
  ApertureValue = 0x9202,
  BrightnessValue = 0x9203,
  ExposureBiasValue = 0x9204,
  MaxApertureValue = 0x9205,
  SubjectDistance = 0x9206,
  MeteringMode = 0x9207,
  LightSource = 0x9208,
  Flash = 0x9209,
  FocalLength = 0x920a,
  MakerNote = 0x927c,
  UserComment = 0x9286,
  SubsecTime = 0x9290,
  SubsecTimeOriginal = 0x9291,
  SubsecTimeDigitized = 0x9292,
  FlashpixVersion = 0xa000,
  ColorSpace = 0xa001,
  PixelXDimension = 0xa002,
  PixelYDimension = 0xa003,
  InteroperabilityIfdPointer = 0xa005,
  FileSource = 0xa300,
  SceneType = 0xa301,
  ExposureMode = 0xa402,
  WhiteBalance = 0xa403,
  DigitalZoomRatio = 0xa404,
  FocalLengthIn35mmFilm = 0xa405,
  SceneCaptureType = 0xa406,
}
}

tags! {
/// The type of an IFD entry (a 2 byte field).
pub enum Type(u16) {
  /// 8-bit unsigned integer
  BYTE = 1,
  /// 8-bit byte that contains a 7-bit ASCII code; the last byte must be zero
  ASCII = 2,
  /// 16-bit unsigned integer
  SHORT = 3,
  /// 32-bit unsigned integer
  LONG = 4,
  /// Fraction stored as two 32-bit unsigned integers
  RATIONAL = 5,
  /// 8-bit signed integer
  SBYTE = 6,
  /// 8-bit byte that may contain anything, depending on the field
  UNDEFINED = 7,
  /// 16-bit signed integer
  SSHORT = 8,
  /// 32-bit signed integer
  SLONG = 9,
  /// Fraction stored as two 32-bit signed integers
  SRATIONAL = 10,
  /// 32-bit IEEE floating point
  FLOAT = 11,
  /// 64-bit IEEE floating point
  DOUBLE = 12,
}
}

impl Type {
  /// Size in bytes of a single component of this type.
  pub fn size(&self) -> usize {
    match *self {
      Type::BYTE | Type::ASCII | Type::SBYTE | Type::UNDEFINED => 1,
      Type::SHORT | Type::SSHORT => 2,
      Type::LONG | Type::SLONG | Type::FLOAT => 4,
      Type::RATIONAL | Type::SRATIONAL | Type::DOUBLE => 8,
    }
  }
}

/// Compression scheme of the thumbnail IFD. Only JPEG thumbnails can be extracted.
pub const COMPRESSION_JPEG: u16 = 6;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_tags_round_trip_their_id() {
    let tag = Tag::from_u16_exhaustive(0xc4a5);
    assert_eq!(tag, Tag::Unknown(0xc4a5));
    assert_eq!(tag.to_u16(), 0xc4a5);
    assert_eq!(tag.to_string(), "0xc4a5");
  }

  #[test]
  fn known_tags_resolve() {
    assert_eq!(Tag::from(0x9003), Tag::DateTimeOriginal);
    assert_eq!(Tag::GpsDateStamp.to_u16(), 0x001d);
    assert_eq!(Tag::ExifIfdPointer.to_string(), "ExifIfdPointer");
  }

  #[test]
  fn type_sizes() {
    let sizes: Vec<usize> =
      (1..=12).map(|t| Type::from_u16(t).map(|t| t.size()).unwrap_or(0)).collect();
    assert_eq!(sizes, vec![1, 1, 2, 4, 8, 1, 1, 2, 4, 8, 4, 8]);
    assert_eq!(Type::from_u16(0), None);
    assert_eq!(Type::from_u16(13), None);
  }
}
