//! # minirt - A Freestanding-Style Runtime Support Library
//!
//! This crate provides the runtime support pieces a program needs when no
//! standard library sits underneath it: a **fixed-arena heap allocator**,
//! math approximation routines, string and formatting primitives, numeric
//! conversions, and raw OS-call wrappers behind an injected capability.
//!
//! ## Overview
//!
//! The heart of the crate is the heap: one statically-sized byte arena,
//! partitioned into an address-ordered chain of variable-size blocks.
//!
//! ```text
//!   Arena Layout:
//!
//!   ┌─────────────────────────────────────────────────────────────────────┐
//!   │                        ARENA (fixed capacity)                       │
//!   │                                                                     │
//!   │   ┌───┬─────────┬───┐┌───┬────────────┬───┐┌───┬──────────────┬───┐ │
//!   │   │HDR│ payload │FTR││HDR│  payload   │FTR││HDR│   payload    │FTR│ │
//!   │   └───┴─────────┴───┘└───┴────────────┴───┘└───┴──────────────┴───┘ │
//!   │    in use             free                  in use                  │
//!   │     │                  ▲ │                   ▲                      │
//!   │     └──── link_next ───┘ └──── link_next ────┘                      │
//!   │                                                                     │
//!   └─────────────────────────────────────────────────────────────────────┘
//!
//!   Every block, free or in use, sits on one singly linked chain that
//!   covers the arena with no gaps and no overlaps.
//! ```
//!
//! Each header and footer carries a sentinel value, so a release can tell a
//! live block from trampled memory before touching anything:
//!
//! ```text
//!   Single Block:
//!   ┌────────────────────────┬───────────────────┬──────────────────────┐
//!   │        Header          │      Payload      │        Footer        │
//!   │  ┌──────────────────┐  │                   │  ┌────────────────┐  │
//!   │  │ sentinel: 4 B    │  │   size bytes,     │  │ size copy:  8 B│  │
//!   │  │ state:    4 B    │  │   multiple of 8   │  │ sentinel:   4 B│  │
//!   │  │ size:     8 B    │  │                   │  │ (padding):  4 B│  │
//!   │  │ next:     8 B    │  │                   │  └────────────────┘  │
//!   │  └──────────────────┘  │                   │                      │
//!   │       24 bytes         │                   │       16 bytes       │
//!   └────────────────────────┴───────────────────┴──────────────────────┘
//!                            ▲
//!                            └── Address handed to the caller
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   minirt
//!   ├── align      - Alignment macro (align!)
//!   ├── block      - Block header/footer layout (internal)
//!   ├── heap       - Heap: allocate / release / reallocate
//!   ├── mem        - Byte-buffer primitives (fill, copy, compare)
//!   ├── string     - NUL-terminated byte-string helpers
//!   ├── convert    - Numeric parsing (to_int, parse_long, parse_float)
//!   ├── math       - f64 approximations (sqrt, exp, ln, sin, ...)
//!   ├── format     - printf-class output (%s %d %x %c)
//!   ├── platform   - OS-call capability trait + libc-backed Os
//!   └── error      - AllocError / OsError
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use minirt::Heap;
//!
//! let mut heap = Heap::with_capacity(1024);
//!
//! let ptr = heap.allocate(64).unwrap();
//! heap.payload_mut(ptr).unwrap()[0] = 42;
//! heap.release(ptr).unwrap();
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no locking, no atomics; callers sharing one
//!   heap across threads must serialize every call themselves.
//! - **Fixed arena**: the heap never grows; exhaustion is an error value.
//! - **Fixed alignment**: every address is 8-byte aligned, nothing more.

pub mod align;
mod block;
pub mod convert;
pub mod error;
pub mod format;
pub mod heap;
pub mod math;
pub mod mem;
pub mod platform;
pub mod string;

pub use error::{AllocError, OsError};
pub use format::Arg;
pub use heap::{BlockPtr, Heap};
pub use platform::{Os, Platform};
