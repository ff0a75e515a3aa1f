//! TIFF fractions, kept in lowest terms.

use std::fmt;

fn gcd(mut a: u64, mut b: u64) -> u64 {
  while b != 0 {
    let r = a % b;
    a = b;
    b = r;
  }
  a
}

/// Unsigned fraction (TIFF type `RATIONAL`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
  pub numerator: u32,
  pub denominator: u32,
}

impl Rational {
  /// Builds the fraction in lowest terms. A zero on either side is stored as is.
  pub fn new(numerator: u32, denominator: u32) -> Rational {
    if numerator == 0 || denominator == 0 {
      return Rational { numerator, denominator };
    }
    let g = gcd(u64::from(numerator), u64::from(denominator)) as u32;
    Rational { numerator: numerator / g, denominator: denominator / g }
  }

  /// The quotient, or `0.0` when the denominator is zero.
  pub fn to_f64(&self) -> f64 {
    if self.denominator == 0 {
      0.0
    } else {
      f64::from(self.numerator) / f64::from(self.denominator)
    }
  }
}

impl fmt::Display for Rational {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.numerator, self.denominator)
  }
}

/// Signed fraction (TIFF type `SRATIONAL`).
///
/// After reduction the sign is carried by the numerator. Values that cannot be
/// represented with a positive denominator (`i32::MIN` as denominator of an odd
/// numerator) keep their original sign layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SRational {
  pub numerator: i32,
  pub denominator: i32,
}

impl SRational {
  pub fn new(numerator: i32, denominator: i32) -> SRational {
    if numerator == 0 || denominator == 0 {
      return SRational { numerator, denominator };
    }
    let (n, d) = (i64::from(numerator), i64::from(denominator));
    let g = gcd(n.unsigned_abs(), d.unsigned_abs()) as i64;
    let (mut n, mut d) = (n / g, d / g);
    if d < 0 {
      n = -n;
      d = -d;
    }
    match (i32::try_from(n), i32::try_from(d)) {
      (Ok(n), Ok(d)) => SRational { numerator: n, denominator: d },
      _ => SRational { numerator, denominator },
    }
  }

  /// The quotient, or `0.0` when the denominator is zero.
  pub fn to_f64(&self) -> f64 {
    if self.denominator == 0 {
      0.0
    } else {
      f64::from(self.numerator) / f64::from(self.denominator)
    }
  }
}

impl fmt::Display for SRational {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.numerator, self.denominator)
  }
}
