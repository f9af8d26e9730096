//! Numeric parsing over byte buffers.
//!
//! atoi-family semantics: skip blanks, take an optional sign, consume
//! digits, stop at the first byte that does not fit. No error reporting;
//! an empty digit run parses as zero, exactly like the classic contract.

fn skip_blanks(s: &[u8]) -> &[u8] {
  let mut s = s;

  while let [b' ' | b'\t' | b'\n', rest @ ..] = s {
    s = rest;
  }

  s
}

fn take_sign(s: &[u8]) -> (i64, &[u8]) {
  match s {
    [b'-', rest @ ..] => (-1, rest),
    [b'+', rest @ ..] => (1, rest),
    _ => (1, s),
  }
}

/// Parses a signed integer in the given base, returning the value and the
/// unconsumed tail. Base 0 defaults to decimal; a digit at or above the
/// base ends the scan. Only ASCII digits participate.
pub fn parse_long(
  s: &[u8],
  base: u32,
) -> (i64, &[u8]) {
  let base = if base == 0 { 10 } else { base };
  let (sign, mut s) = take_sign(skip_blanks(s));
  let mut result: i64 = 0;

  while let [byte @ b'0'..=b'9', rest @ ..] = s {
    let digit = u32::from(byte - b'0');

    if digit >= base {
      break;
    }

    result = result * i64::from(base) + i64::from(digit);
    s = rest;
  }

  (sign * result, s)
}

/// Decimal integer parse, truncated to the C `int` width.
pub fn to_int(s: &[u8]) -> i32 {
  parse_long(s, 10).0 as i32
}

/// Decimal integer parse.
pub fn to_long(s: &[u8]) -> i64 {
  parse_long(s, 10).0
}

/// Parses a decimal floating-point value: sign, integer part, optional
/// fraction. No exponent syntax. Returns the value and the unconsumed
/// tail.
pub fn parse_float(s: &[u8]) -> (f64, &[u8]) {
  let (sign, mut s) = take_sign(skip_blanks(s));
  let mut result = 0.0f64;

  while let [byte @ b'0'..=b'9', rest @ ..] = s {
    result = result * 10.0 + f64::from(byte - b'0');
    s = rest;
  }

  if let [b'.', rest @ ..] = s {
    s = rest;

    let mut div = 10.0f64;

    while let [byte @ b'0'..=b'9', rest @ ..] = s {
      result += f64::from(byte - b'0') / div;
      div *= 10.0;
      s = rest;
    }
  }

  (sign as f64 * result, s)
}
