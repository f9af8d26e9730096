//! The OS-call capability.
//!
//! Everything that crosses into the kernel goes through the [`Platform`]
//! trait, so consumers take an injected capability instead of calling the
//! OS directly. [`Os`] is the real implementation over libc; tests
//! substitute an in-memory fake.

use std::ffi::CStr;

use crate::error::OsError;

/// Standard input descriptor.
pub const STDIN: i32 = 0;

/// Standard output descriptor.
pub const STDOUT: i32 = 1;

/// Standard error descriptor.
pub const STDERR: i32 = 2;

/// Raw OS entry points: file I/O, process spawn, and termination.
pub trait Platform {
  fn open(
    &mut self,
    path: &CStr,
    flags: i32,
  ) -> Result<i32, OsError>;

  fn close(
    &mut self,
    fd: i32,
  ) -> Result<(), OsError>;

  fn read(
    &mut self,
    fd: i32,
    buf: &mut [u8],
  ) -> Result<usize, OsError>;

  fn write(
    &mut self,
    fd: i32,
    buf: &[u8],
  ) -> Result<usize, OsError>;

  /// Size in bytes of the file at `path`.
  fn file_size(
    &mut self,
    path: &CStr,
  ) -> Result<u64, OsError>;

  /// Launches `path` with the given argument vector, without waiting for
  /// it.
  fn spawn(
    &mut self,
    path: &CStr,
    argv: &[&CStr],
  ) -> Result<(), OsError>;

  /// Terminates the process immediately.
  fn exit(
    &mut self,
    code: i32,
  ) -> !;
}

/// The real operating system.
pub struct Os;

fn last_error(call: &'static str) -> OsError {
  OsError {
    call,
    errno: std::io::Error::last_os_error().raw_os_error().unwrap_or(0),
  }
}

impl Platform for Os {
  fn open(
    &mut self,
    path: &CStr,
    flags: i32,
  ) -> Result<i32, OsError> {
    // The trailing mode only matters under O_CREAT.
    let fd = unsafe { libc::open(path.as_ptr(), flags, 0o644) };

    if fd < 0 { Err(last_error("open")) } else { Ok(fd) }
  }

  fn close(
    &mut self,
    fd: i32,
  ) -> Result<(), OsError> {
    if unsafe { libc::close(fd) } < 0 {
      Err(last_error("close"))
    } else {
      Ok(())
    }
  }

  fn read(
    &mut self,
    fd: i32,
    buf: &mut [u8],
  ) -> Result<usize, OsError> {
    let count = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };

    if count < 0 { Err(last_error("read")) } else { Ok(count as usize) }
  }

  fn write(
    &mut self,
    fd: i32,
    buf: &[u8],
  ) -> Result<usize, OsError> {
    let count = unsafe { libc::write(fd, buf.as_ptr().cast(), buf.len()) };

    if count < 0 { Err(last_error("write")) } else { Ok(count as usize) }
  }

  fn file_size(
    &mut self,
    path: &CStr,
  ) -> Result<u64, OsError> {
    let mut st: libc::stat = unsafe { std::mem::zeroed() };

    if unsafe { libc::stat(path.as_ptr(), &mut st) } < 0 {
      Err(last_error("stat"))
    } else {
      Ok(st.st_size as u64)
    }
  }

  fn spawn(
    &mut self,
    path: &CStr,
    argv: &[&CStr],
  ) -> Result<(), OsError> {
    let mut argv_ptrs: Vec<*const libc::c_char> =
      argv.iter().map(|arg| arg.as_ptr()).collect();

    argv_ptrs.push(std::ptr::null());

    match unsafe { libc::fork() } {
      -1 => Err(last_error("fork")),
      0 => unsafe {
        libc::execv(path.as_ptr(), argv_ptrs.as_ptr());
        // Only reached when exec itself failed.
        libc::_exit(127)
      },
      _ => Ok(()),
    }
  }

  fn exit(
    &mut self,
    code: i32,
  ) -> ! {
    unsafe { libc::_exit(code) }
  }
}

#[cfg(test)]
mod tests {
  use std::ffi::CString;

  use super::*;

  #[test]
  fn test_file_roundtrip() {
    let path = std::env::temp_dir().join("minirt_platform_roundtrip");
    let c_path = CString::new(path.to_str().unwrap()).unwrap();
    let mut os = Os;

    let fd = os
      .open(&c_path, libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC)
      .unwrap();

    assert_eq!(5, os.write(fd, b"hello").unwrap());
    os.close(fd).unwrap();

    assert_eq!(5, os.file_size(&c_path).unwrap());

    let fd = os.open(&c_path, libc::O_RDONLY).unwrap();
    let mut buf = [0u8; 16];

    assert_eq!(5, os.read(fd, &mut buf).unwrap());
    assert_eq!(b"hello", &buf[..5]);
    os.close(fd).unwrap();

    std::fs::remove_file(path).unwrap();
  }

  #[test]
  fn test_errors_carry_the_call_name() {
    let mut os = Os;

    let err = os.write(-1, b"x").unwrap_err();

    assert_eq!("write", err.call);
    assert_ne!(0, err.errno);
  }
}
