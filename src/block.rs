//! Block header/footer layout over the arena bytes.
//!
//! A block is addressed by the byte offset of its header. All field access
//! is bounds-checked slice access; the arena never hands out raw pointers.

/// Bytes of metadata in front of every payload.
pub const HEADER_SIZE: usize = 24;

/// Bytes of metadata behind every payload.
pub const FOOTER_SIZE: usize = 16;

/// Start sentinel, present in every live header.
pub const MAGIC_HEAD: u32 = 0xDEAD_BEEF;

/// End sentinel, present in every live footer.
pub const MAGIC_TAIL: u32 = 0xBAAD_F00D;

/// Encodes "no next block" in the chain link.
const NIL: u64 = u64::MAX;

// Header field offsets: sentinel u32, state u32, payload size u64, next u64.
const HDR_STATE: usize = 4;
const HDR_SIZE: usize = 8;
const HDR_NEXT: usize = 16;

// Footer field offsets: mirrored size u64, sentinel u32, 4 bytes unused.
const FTR_MAGIC: usize = 8;

fn read_u32(
  arena: &[u8],
  at: usize,
) -> u32 {
  let mut bytes = [0u8; 4];
  bytes.copy_from_slice(&arena[at..at + 4]);
  u32::from_le_bytes(bytes)
}

fn write_u32(
  arena: &mut [u8],
  at: usize,
  value: u32,
) {
  arena[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn read_u64(
  arena: &[u8],
  at: usize,
) -> u64 {
  let mut bytes = [0u8; 8];
  bytes.copy_from_slice(&arena[at..at + 8]);
  u64::from_le_bytes(bytes)
}

fn write_u64(
  arena: &mut [u8],
  at: usize,
  value: u64,
) {
  arena[at..at + 8].copy_from_slice(&value.to_le_bytes());
}

/// Total bytes a block of the given payload size occupies in the arena.
pub fn span(size: usize) -> usize {
  HEADER_SIZE + size + FOOTER_SIZE
}

/// Offset of the payload handed to the caller.
pub fn payload_offset(block: usize) -> usize {
  block + HEADER_SIZE
}

pub fn payload_size(
  arena: &[u8],
  block: usize,
) -> usize {
  read_u64(arena, block + HDR_SIZE) as usize
}

pub fn set_payload_size(
  arena: &mut [u8],
  block: usize,
  size: usize,
) {
  write_u64(arena, block + HDR_SIZE, size as u64);
}

pub fn is_free(
  arena: &[u8],
  block: usize,
) -> bool {
  read_u32(arena, block + HDR_STATE) != 0
}

pub fn set_free(
  arena: &mut [u8],
  block: usize,
  free: bool,
) {
  write_u32(arena, block + HDR_STATE, free as u32);
}

pub fn next(
  arena: &[u8],
  block: usize,
) -> Option<usize> {
  match read_u64(arena, block + HDR_NEXT) {
    NIL => None,
    off => Some(off as usize),
  }
}

pub fn set_next(
  arena: &mut [u8],
  block: usize,
  next: Option<usize>,
) {
  write_u64(arena, block + HDR_NEXT, next.map_or(NIL, |off| off as u64));
}

/// Writes the footer matching the header's current payload size.
pub fn write_footer(
  arena: &mut [u8],
  block: usize,
) {
  let size = payload_size(arena, block);
  let footer = block + HEADER_SIZE + size;
  write_u64(arena, footer, size as u64);
  write_u32(arena, footer + FTR_MAGIC, MAGIC_TAIL);
}

/// Stamps a fresh free block: both sentinels, size, state, and chain link.
pub fn format(
  arena: &mut [u8],
  block: usize,
  size: usize,
  next: Option<usize>,
) {
  write_u32(arena, block, MAGIC_HEAD);
  set_free(arena, block, true);
  set_payload_size(arena, block, size);
  set_next(arena, block, next);
  write_footer(arena, block);
}

/// Checks both sentinels, the mirrored size, and that the block lies fully
/// inside the arena. Everything a release must trust goes through here.
pub fn is_valid(
  arena: &[u8],
  block: usize,
) -> bool {
  let header_end = match block.checked_add(HEADER_SIZE) {
    Some(end) if end <= arena.len() => end,
    _ => return false,
  };

  if read_u32(arena, block) != MAGIC_HEAD {
    return false;
  }

  let size = payload_size(arena, block);
  let footer = match header_end
    .checked_add(size)
    .filter(|at| at.checked_add(FOOTER_SIZE).is_some_and(|end| end <= arena.len()))
  {
    Some(at) => at,
    None => return false,
  };

  read_u64(arena, footer) as usize == size && read_u32(arena, footer + FTR_MAGIC) == MAGIC_TAIL
}

/// Offset of the physically following block.
pub fn next_neighbor(
  arena: &[u8],
  block: usize,
) -> usize {
  block + span(payload_size(arena, block))
}

/// Walks backward through the preceding footer to find the block before
/// this one. Returns `None` at the arena start or when the footer or the
/// recovered header fails its sentinel check.
pub fn prev_neighbor(
  arena: &[u8],
  block: usize,
) -> Option<usize> {
  let footer = block.checked_sub(FOOTER_SIZE)?;

  if read_u32(arena, footer + FTR_MAGIC) != MAGIC_TAIL {
    return None;
  }

  let size = read_u64(arena, footer) as usize;
  let prev = footer.checked_sub(size)?.checked_sub(HEADER_SIZE)?;

  if read_u32(arena, prev) != MAGIC_HEAD {
    return None;
  }

  Some(prev)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_format_roundtrip() {
    let mut arena = vec![0u8; 256];

    format(&mut arena, 0, 64, Some(104));

    assert!(is_valid(&arena, 0));
    assert!(is_free(&arena, 0));
    assert_eq!(64, payload_size(&arena, 0));
    assert_eq!(Some(104), next(&arena, 0));
    assert_eq!(104, next_neighbor(&arena, 0));
  }

  #[test]
  fn test_end_of_chain_link() {
    let mut arena = vec![0u8; 256];

    format(&mut arena, 0, 64, None);

    assert_eq!(None, next(&arena, 0));
  }

  #[test]
  fn test_prev_neighbor_roundtrip() {
    let mut arena = vec![0u8; 256];

    format(&mut arena, 0, 32, Some(72));
    format(&mut arena, 72, 48, None);

    assert_eq!(Some(0), prev_neighbor(&arena, 72));
    assert_eq!(None, prev_neighbor(&arena, 0));
  }

  #[test]
  fn test_is_valid_rejects_bad_sentinels() {
    let mut arena = vec![0u8; 256];

    format(&mut arena, 0, 32, None);
    arena[0] = 0;

    assert!(!is_valid(&arena, 0));
  }

  #[test]
  fn test_is_valid_rejects_size_mismatch() {
    let mut arena = vec![0u8; 256];

    format(&mut arena, 0, 32, None);
    set_payload_size(&mut arena, 0, 24);

    assert!(!is_valid(&arena, 0));
  }

  #[test]
  fn test_is_valid_rejects_out_of_bounds_size() {
    let mut arena = vec![0u8; 256];

    format(&mut arena, 0, 32, None);
    set_payload_size(&mut arena, 0, usize::MAX - HEADER_SIZE);

    assert!(!is_valid(&arena, 0));
  }
}
