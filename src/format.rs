//! printf-class output.
//!
//! A minimal formatter: `%s` `%d` `%x` `%c`, with anything else after a
//! `%` echoed literally. Rendering happens into a byte buffer; writing
//! goes through the injected [`Platform`] capability.

use crate::error::OsError;
use crate::platform::{self, Platform};
use crate::string;

/// A formatting argument.
#[derive(Clone, Copy, Debug)]
pub enum Arg<'a> {
  /// NUL-terminated byte string, rendered by `%s`.
  Str(&'a [u8]),
  /// Integer, rendered by `%d` (signed decimal) or `%x` (hex bit pattern).
  Int(i64),
  /// Single byte, rendered by `%c`.
  Char(u8),
}

/// Renders `fmt` into `out`, consuming one argument per specifier. The
/// format string ends at its NUL terminator or the end of the slice,
/// whichever comes first. A specifier whose argument is missing or of the
/// wrong kind is echoed literally.
pub fn format_into(
  out: &mut Vec<u8>,
  fmt: &[u8],
  args: &[Arg],
) {
  let mut args = args.iter();
  let mut i = 0;

  while i < fmt.len() && fmt[i] != 0 {
    if fmt[i] != b'%' {
      out.push(fmt[i]);
      i += 1;
      continue;
    }

    i += 1;

    if i >= fmt.len() || fmt[i] == 0 {
      break;
    }

    match fmt[i] {
      b's' => match args.next() {
        Some(Arg::Str(s)) => out.extend_from_slice(string::terminated(s)),
        _ => out.push(b's'),
      },
      b'd' => match args.next() {
        Some(Arg::Int(n)) => push_int(out, *n, 10),
        _ => out.push(b'd'),
      },
      b'x' => match args.next() {
        Some(Arg::Int(n)) => push_int(out, *n, 16),
        _ => out.push(b'x'),
      },
      b'c' => match args.next() {
        Some(Arg::Char(c)) => out.push(*c),
        _ => out.push(b'c'),
      },
      // Unknown specifiers come out literally.
      other => out.push(other),
    }

    i += 1;
  }
}

/// Renders `fmt` and writes it to standard output through `io`.
pub fn print_to(
  io: &mut dyn Platform,
  fmt: &[u8],
  args: &[Arg],
) -> Result<(), OsError> {
  let mut out = Vec::new();

  format_into(&mut out, fmt, args);

  let mut rest = &out[..];

  while !rest.is_empty() {
    let written = io.write(platform::STDOUT, rest)?;

    if written == 0 {
      break;
    }

    rest = &rest[written..];
  }

  Ok(())
}

// Reverse-fill into a fixed window, then append. 32 bytes covers a sign
// plus 21 decimal digits.
fn push_int(
  out: &mut Vec<u8>,
  value: i64,
  base: u64,
) {
  let mut buf = [0u8; 32];
  let mut at = buf.len();

  let negative = base == 10 && value < 0;
  let mut magnitude = if base == 10 {
    value.unsigned_abs()
  } else {
    value as u64
  };

  if magnitude == 0 {
    at -= 1;
    buf[at] = b'0';
  }

  while magnitude != 0 {
    let digit = (magnitude % base) as u8;

    at -= 1;
    buf[at] = if digit < 10 { b'0' + digit } else { b'a' + digit - 10 };
    magnitude /= base;
  }

  if negative {
    at -= 1;
    buf[at] = b'-';
  }

  out.extend_from_slice(&buf[at..]);
}

#[cfg(test)]
mod tests {
  use std::ffi::CStr;

  use super::*;
  use crate::platform::STDOUT;

  struct Sink {
    written: Vec<u8>,
  }

  impl Platform for Sink {
    fn open(
      &mut self,
      _path: &CStr,
      _flags: i32,
    ) -> Result<i32, OsError> {
      unreachable!()
    }

    fn close(
      &mut self,
      _fd: i32,
    ) -> Result<(), OsError> {
      unreachable!()
    }

    fn read(
      &mut self,
      _fd: i32,
      _buf: &mut [u8],
    ) -> Result<usize, OsError> {
      unreachable!()
    }

    fn write(
      &mut self,
      fd: i32,
      buf: &[u8],
    ) -> Result<usize, OsError> {
      assert_eq!(STDOUT, fd);

      // Short writes exercise the retry loop.
      let take = buf.len().min(3);

      self.written.extend_from_slice(&buf[..take]);

      Ok(take)
    }

    fn file_size(
      &mut self,
      _path: &CStr,
    ) -> Result<u64, OsError> {
      unreachable!()
    }

    fn spawn(
      &mut self,
      _path: &CStr,
      _argv: &[&CStr],
    ) -> Result<(), OsError> {
      unreachable!()
    }

    fn exit(
      &mut self,
      code: i32,
    ) -> ! {
      panic!("exit({code})")
    }
  }

  fn render(
    fmt: &[u8],
    args: &[Arg],
  ) -> Vec<u8> {
    let mut out = Vec::new();

    format_into(&mut out, fmt, args);
    out
  }

  #[test]
  fn test_specifiers() {
    let out = render(
      b"%s=%d (%x) %c\0ignored",
      &[
        Arg::Str(b"count\0junk"),
        Arg::Int(-42),
        Arg::Int(255),
        Arg::Char(b'!'),
      ],
    );

    assert_eq!(b"count=-42 (ff) !", &out[..]);
  }

  #[test]
  fn test_zero_and_hex_bit_pattern() {
    assert_eq!(b"0", &render(b"%d", &[Arg::Int(0)])[..]);
    assert_eq!(
      b"ffffffffffffffff",
      &render(b"%x", &[Arg::Int(-1)])[..]
    );
  }

  #[test]
  fn test_unknown_specifier_is_literal() {
    assert_eq!(b"100%q", &render(b"%d%%%q", &[Arg::Int(100)])[..]);
  }

  #[test]
  fn test_missing_or_mismatched_argument() {
    assert_eq!(b"d", &render(b"%d", &[])[..]);
    assert_eq!(b"s", &render(b"%s", &[Arg::Int(1)])[..]);
  }

  #[test]
  fn test_trailing_percent() {
    assert_eq!(b"x=", &render(b"x=%", &[])[..]);
  }

  #[test]
  fn test_print_to_drains_short_writes() {
    let mut sink = Sink { written: Vec::new() };

    print_to(&mut sink, b"value=%d\n", &[Arg::Int(1234)]).unwrap();

    assert_eq!(b"value=1234\n", &sink.written[..]);
  }
}
