use std::io::Read;

use minirt::{Arg, Heap, Os, format, mem};

/// Waits until the user presses ENTER.
/// Useful when you want to follow the chain state step by step.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Dumps every block of the chain: offset, payload size, state.
fn print_chain(heap: &Heap) {
  println!("chain ({} bytes of arena):", heap.capacity());

  for info in heap.blocks() {
    println!(
      "  block @ {:#06x}  payload {:4} bytes  {}",
      info.offset,
      info.size,
      if info.free { "free" } else { "in use" }
    );
  }
}

fn main() {
  // A small arena keeps the offsets readable. Every block carries a
  // 24-byte header and a 16-byte footer around its payload.
  let mut heap = Heap::with_capacity(1024);

  println!("[0] Fresh heap: one free block spanning the whole arena");
  print_chain(&heap);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Allocate 64 bytes. The free block splits: an in-use head and a
  //    free tail.
  // --------------------------------------------------------------------
  let first = heap.allocate(64).unwrap();
  println!("\n[1] allocate(64) -> payload at offset {:#x}", first.addr());
  print_chain(&heap);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Allocate 128 bytes and fill them, to show the payload is usable.
  // --------------------------------------------------------------------
  let second = heap.allocate(128).unwrap();
  mem::fill(heap.payload_mut(second).unwrap(), 0xAB);
  println!("\n[2] allocate(128) -> payload at offset {:#x}, filled with 0xAB", second.addr());
  print_chain(&heap);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Release the first block, then allocate 32 bytes.
  //
  //    First-fit reuses the freed 64-byte block. The 32-byte leftover is
  //    below the split threshold, so the whole block is handed back.
  // --------------------------------------------------------------------
  heap.release(first).unwrap();
  println!("\n[3] release(first)");
  print_chain(&heap);

  let third = heap.allocate(32).unwrap();
  println!(
    "\n    allocate(32) -> offset {:#x} ({})",
    third.addr(),
    if third == first {
      "reused the freed block"
    } else {
      "allocated somewhere else"
    }
  );
  print_chain(&heap);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) Reallocate the 128-byte block down to 16 bytes. The data moves,
  //    the old block is released and coalesces with its free neighbors.
  // --------------------------------------------------------------------
  let shrunk = heap.reallocate(Some(second), 16).unwrap().unwrap();
  println!(
    "\n[4] reallocate(second, 16) -> offset {:#x}, first byte {:#x}",
    shrunk.addr(),
    heap.payload(shrunk).unwrap()[0]
  );
  print_chain(&heap);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) Release everything. Eager coalescing restores a single free block
  //    covering the arena.
  // --------------------------------------------------------------------
  heap.release(third).unwrap();
  heap.release(shrunk).unwrap();
  println!("\n[5] released everything");
  print_chain(&heap);

  // --------------------------------------------------------------------
  // 6) End of demo, reported through the crate's own printf-style path.
  // --------------------------------------------------------------------
  format::print_to(
    &mut Os,
    b"\n[6] done: %d block(s), largest free payload %d bytes\n",
    &[
      Arg::Int(heap.blocks().count() as i64),
      Arg::Int(heap.largest_free() as i64),
    ],
  )
  .unwrap();
}
