//! Error types for the heap and the platform capability.

use thiserror::Error;

/// Failures the heap reports. Nothing in the heap panics; every failure
/// comes back as one of these.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
  /// No free block in the chain can hold the request. The chain is left
  /// untouched; the heap never grows its arena.
  #[error("out of memory: no free block holds {requested} bytes")]
  OutOfMemory { requested: usize },

  /// A block failed its sentinel or mirrored-size validation. The block is
  /// not mutated.
  #[error("integrity violation: block at offset {offset:#x} failed sentinel validation")]
  IntegrityViolation { offset: usize },

  /// The block is already free. Reported before any coalescing runs.
  #[error("double release: block at offset {offset:#x} is already free")]
  DoubleRelease { offset: usize },
}

/// A raw OS call failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{call} failed: errno {errno}")]
pub struct OsError {
  pub call: &'static str,
  pub errno: i32,
}
