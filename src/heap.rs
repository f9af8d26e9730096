//! The fixed-arena heap.
//!
//! One contiguous byte arena, carved into an address-ordered chain of
//! blocks. Allocation is a first-fit scan with threshold-guarded splitting;
//! release validates both sentinels and then eagerly coalesces with the
//! physical neighbors on either side.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use log::{debug, trace};

use crate::{align, block, error::AllocError, mem};

pub use crate::block::{FOOTER_SIZE, HEADER_SIZE, MAGIC_HEAD, MAGIC_TAIL};

/// Default arena capacity in bytes.
pub const HEAP_CAPACITY: usize = 128 * 1024 * 1024;

/// Every payload size and every returned address is a multiple of this.
pub const ALIGNMENT: usize = 8;

/// Smallest leftover worth splitting off as its own free block. Anything
/// smaller stays attached to the allocation rather than becoming a sliver.
const MIN_SPLIT_LEFTOVER: usize = HEADER_SIZE + FOOTER_SIZE + ALIGNMENT;

/// Address of a live payload: the arena offset just past its block header.
///
/// Non-null by construction. The nullable cases of the classic contract are
/// spelled `Option<BlockPtr>` at the [`Heap::reallocate`] boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockPtr(usize);

impl BlockPtr {
  /// Arena offset of the payload.
  pub fn addr(self) -> usize {
    self.0
  }
}

/// One entry of the block chain, as reported by [`Heap::blocks`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
  /// Offset of the block header.
  pub offset: usize,
  /// Usable payload capacity in bytes.
  pub size: usize,
  /// Whether the block is free.
  pub free: bool,
}

/// A fixed-arena allocator instance: the arena buffer plus the chain head,
/// bundled as one value so independent heaps can coexist.
pub struct Heap {
  arena: Box<[u8]>,
  head: usize,
}

impl Heap {
  /// Creates a heap with the default arena capacity.
  pub fn new() -> Self {
    Self::with_capacity(HEAP_CAPACITY)
  }

  /// Creates a heap over a zero-initialized arena of roughly `capacity`
  /// bytes. The usable capacity is rounded down so the initial block's
  /// payload is a multiple of the alignment unit.
  ///
  /// # Panics
  ///
  /// Panics if `capacity` cannot hold a single aligned block.
  pub fn with_capacity(capacity: usize) -> Self {
    assert!(
      capacity >= block::span(ALIGNMENT),
      "capacity must hold at least one aligned block"
    );

    let payload = (capacity - HEADER_SIZE - FOOTER_SIZE) & !(ALIGNMENT - 1);
    let mut arena = vec![0u8; block::span(payload)].into_boxed_slice();

    block::format(&mut arena, 0, payload, None);

    debug!(
      "heap: arena {} bytes, initial free payload {} bytes",
      arena.len(),
      payload
    );

    Self { arena, head: 0 }
  }

  /// Arena capacity in bytes, metadata included.
  pub fn capacity(&self) -> usize {
    self.arena.len()
  }

  /// Hands out `size` bytes (rounded up to the alignment unit) from the
  /// first free block large enough to hold them.
  ///
  /// When the chosen block's leftover could host a minimally useful block
  /// of its own, the tail is split off and stays free; otherwise the whole
  /// block is handed out as-is.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<BlockPtr, AllocError> {
    if size > self.arena.len() {
      return Err(AllocError::OutOfMemory { requested: size });
    }

    let size = align!(size);
    let mut current = Some(self.head);

    while let Some(cur) = current {
      if block::is_free(&self.arena, cur) && block::payload_size(&self.arena, cur) >= size {
        let remaining = block::payload_size(&self.arena, cur) - size;

        if remaining >= MIN_SPLIT_LEFTOVER {
          let tail = cur + block::span(size);
          let link = block::next(&self.arena, cur);

          block::format(
            &mut self.arena,
            tail,
            remaining - HEADER_SIZE - FOOTER_SIZE,
            link,
          );
          block::set_payload_size(&mut self.arena, cur, size);
          block::set_next(&mut self.arena, cur, Some(tail));
          block::write_footer(&mut self.arena, cur);

          trace!("allocate: split block {cur:#x}, free tail at {tail:#x}");
        }

        block::set_free(&mut self.arena, cur, false);

        trace!("allocate: {size} bytes at block {cur:#x}");
        return Ok(BlockPtr(block::payload_offset(cur)));
      }

      current = block::next(&self.arena, cur);
    }

    trace!("allocate: no free block holds {size} bytes");
    Err(AllocError::OutOfMemory { requested: size })
  }

  /// Returns a block to the heap and eagerly merges it with whichever
  /// physical neighbors are free, so two adjacent free blocks never
  /// survive a release.
  ///
  /// A block that fails sentinel validation is reported and left alone; a
  /// block that is already free is reported before any coalescing runs.
  pub fn release(
    &mut self,
    ptr: BlockPtr,
  ) -> Result<(), AllocError> {
    let cur = self.live_block(ptr)?;

    block::set_free(&mut self.arena, cur, true);

    // Forward: absorb the physically next block when it is live and free.
    let next_phys = block::next_neighbor(&self.arena, cur);

    if next_phys < self.arena.len()
      && block::is_valid(&self.arena, next_phys)
      && block::is_free(&self.arena, next_phys)
    {
      let merged = block::payload_size(&self.arena, cur)
        + block::span(block::payload_size(&self.arena, next_phys));
      let link = block::next(&self.arena, next_phys);

      block::set_payload_size(&mut self.arena, cur, merged);
      block::set_next(&mut self.arena, cur, link);
      block::write_footer(&mut self.arena, cur);

      trace!("release: merged {next_phys:#x} forward into {cur:#x}");
    }

    // Backward: merge this block into its predecessor when that is free.
    match block::prev_neighbor(&self.arena, cur) {
      Some(prev) if block::is_valid(&self.arena, prev) && block::is_free(&self.arena, prev) => {
        let merged = block::payload_size(&self.arena, prev)
          + block::span(block::payload_size(&self.arena, cur));
        let link = block::next(&self.arena, cur);

        block::set_payload_size(&mut self.arena, prev, merged);
        block::set_next(&mut self.arena, prev, link);
        block::write_footer(&mut self.arena, prev);

        trace!("release: merged {cur:#x} backward into {prev:#x}");
      }
      _ => block::write_footer(&mut self.arena, cur),
    }

    Ok(())
  }

  /// Resizes an allocation.
  ///
  /// - `None` behaves as [`Heap::allocate`].
  /// - `new_size == 0` behaves as [`Heap::release`] and reports no memory.
  /// - Otherwise a fresh block is allocated, `min(old size, new_size)`
  ///   bytes are copied over, and the old block is released. On exhaustion
  ///   the old block is left intact and usable.
  pub fn reallocate(
    &mut self,
    ptr: Option<BlockPtr>,
    new_size: usize,
  ) -> Result<Option<BlockPtr>, AllocError> {
    let Some(old) = ptr else {
      return self.allocate(new_size).map(Some);
    };

    if new_size == 0 {
      self.release(old)?;
      return Ok(None);
    }

    let old_block = self.live_block(old)?;
    let old_size = block::payload_size(&self.arena, old_block);

    let fresh = self.allocate(new_size)?;

    self.copy_payload(old.addr(), fresh.addr(), old_size.min(new_size));
    self.release(old)?;

    Ok(Some(fresh))
  }

  /// Read access to a live payload.
  pub fn payload(
    &self,
    ptr: BlockPtr,
  ) -> Result<&[u8], AllocError> {
    let cur = self.live_block(ptr)?;
    let at = block::payload_offset(cur);

    Ok(&self.arena[at..at + block::payload_size(&self.arena, cur)])
  }

  /// Write access to a live payload.
  pub fn payload_mut(
    &mut self,
    ptr: BlockPtr,
  ) -> Result<&mut [u8], AllocError> {
    let cur = self.live_block(ptr)?;
    let at = block::payload_offset(cur);
    let size = block::payload_size(&self.arena, cur);

    Ok(&mut self.arena[at..at + size])
  }

  /// Walks the chain from the head, yielding every block in address order.
  pub fn blocks(&self) -> Blocks<'_> {
    Blocks {
      arena: &self.arena,
      current: Some(self.head),
    }
  }

  /// Payload size of the largest free block, or zero when nothing is free.
  pub fn largest_free(&self) -> usize {
    self
      .blocks()
      .filter(|info| info.free)
      .map(|info| info.size)
      .max()
      .unwrap_or(0)
  }

  /// Order-sensitive digest of the chain state, for before/after
  /// comparisons in diagnostics and tests.
  pub fn chain_digest(&self) -> u64 {
    let mut hasher = DefaultHasher::new();

    for info in self.blocks() {
      (info.offset, info.size, info.free).hash(&mut hasher);
    }

    hasher.finish()
  }

  /// Recovers and validates the header behind a payload address. The
  /// in-use check runs last, so a stale address whose block was absorbed
  /// by coalescing surfaces as an integrity violation, not a double
  /// release.
  fn live_block(
    &self,
    ptr: BlockPtr,
  ) -> Result<usize, AllocError> {
    let cur = ptr
      .addr()
      .checked_sub(HEADER_SIZE)
      .ok_or(AllocError::IntegrityViolation { offset: ptr.addr() })?;

    if !block::is_valid(&self.arena, cur) {
      return Err(AllocError::IntegrityViolation { offset: cur });
    }

    if block::is_free(&self.arena, cur) {
      return Err(AllocError::DoubleRelease { offset: cur });
    }

    Ok(cur)
  }

  /// Copies between two payloads of the same arena. The ranges belong to
  /// distinct blocks, so splitting the arena slice yields two disjoint
  /// borrows for the byte-copy primitive.
  fn copy_payload(
    &mut self,
    src: usize,
    dst: usize,
    len: usize,
  ) {
    if src < dst {
      let (lo, hi) = self.arena.split_at_mut(dst);
      mem::copy(&mut hi[..len], &lo[src..src + len]);
    } else {
      let (lo, hi) = self.arena.split_at_mut(src);
      mem::copy(&mut lo[dst..dst + len], &hi[..len]);
    }
  }

  #[cfg(test)]
  fn poke(
    &mut self,
    at: usize,
    value: u8,
  ) {
    self.arena[at] = value;
  }
}

impl Default for Heap {
  fn default() -> Self {
    Self::new()
  }
}

/// Iterator over the block chain. See [`Heap::blocks`].
pub struct Blocks<'a> {
  arena: &'a [u8],
  current: Option<usize>,
}

impl Iterator for Blocks<'_> {
  type Item = BlockInfo;

  fn next(&mut self) -> Option<BlockInfo> {
    let offset = self.current?;
    self.current = block::next(self.arena, offset);

    Some(BlockInfo {
      offset,
      size: block::payload_size(self.arena, offset),
      free: block::is_free(self.arena, offset),
    })
  }
}


#[cfg(test)]
mod proptests {
  use proptest::prelude::*;

  use super::*;

  proptest! {
    #[test]
    fn allocations_stay_aligned_and_disjoint(
      sizes in prop::collection::vec(0usize..200, 1..24),
    ) {
      let mut heap = Heap::with_capacity(16 * 1024);
      let mut live = Vec::new();

      for size in sizes {
        if let Ok(ptr) = heap.allocate(size) {
          let len = heap.payload(ptr).unwrap().len();
          live.push((ptr.addr(), len));
        }
      }

      for (addr, _) in &live {
        prop_assert_eq!(0, addr % ALIGNMENT);
      }

      for (i, (a, a_len)) in live.iter().enumerate() {
        for (b, b_len) in live.iter().skip(i + 1) {
          prop_assert!(a + a_len <= *b || b + b_len <= *a);
        }
      }
    }

    #[test]
    fn release_in_any_order_restores_one_block(
      (sizes, order) in prop::collection::vec(0usize..200, 1..24)
        .prop_flat_map(|sizes| {
          let indices: Vec<usize> = (0..sizes.len()).collect();
          (Just(sizes), Just(indices).prop_shuffle())
        }),
    ) {
      let mut heap = Heap::with_capacity(16 * 1024);
      let fresh = heap.chain_digest();

      let ptrs: Vec<_> = sizes
        .iter()
        .map(|&size| heap.allocate(size).unwrap())
        .collect();

      for &i in &order {
        heap.release(ptrs[i]).unwrap();
      }

      prop_assert_eq!(1, heap.blocks().count());
      prop_assert_eq!(
        heap.capacity() - HEADER_SIZE - FOOTER_SIZE,
        heap.largest_free()
      );
      prop_assert_eq!(fresh, heap.chain_digest());
    }

    #[test]
    fn oversized_request_leaves_chain_unchanged(
      sizes in prop::collection::vec(0usize..200, 0..24),
    ) {
      let mut heap = Heap::with_capacity(16 * 1024);

      for size in sizes {
        let _ = heap.allocate(size);
      }

      let digest = heap.chain_digest();
      let too_big = heap.largest_free() + 1;

      prop_assert!(heap.allocate(too_big).is_err());
      prop_assert_eq!(digest, heap.chain_digest());
    }
  }
}
