//! # tgalloc - Type-Generic Allocation
//!
//! This crate allocates, grows and releases memory for values of any type
//! without the caller spelling out sizes or alignments, and without tying the
//! program to one allocator. Every call names (or defaults) the **binding** it
//! goes through, so two call sites in the same function may use two
//! different allocators.
//!
//! ## Overview
//!
//! ```text
//!   Dispatch:
//!
//!   ┌──────────────────────┐   *mut T    ┌──────────────────────┐
//!   │  palloc!(slot, n)    │ ──────────► │  Resolver            │
//!   │  pfree!(ptr, n)      │             │  size = n * size_of  │
//!   │  prealloc!(slot,o,n) │             │  align = align_of    │
//!   └──────────────────────┘             └──────────┬───────────┘
//!              ▲                                    │ (align, size)
//!              │ slot ← ptr | null                  ▼
//!              │                         ┌──────────────────────┐
//!              └──────────────────────── │  Binding             │
//!                                        │  allocate            │
//!                                        │  reallocate          │
//!                                        │  free                │
//!                                        └──────────────────────┘
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   tgalloc
//!   ├── resolve   - Shape, size_of_one/size_of_n/alignment_of
//!   ├── binding   - Binding trait (allocate, reallocate, free)
//!   ├── heap      - Heap, the default malloc/realloc/free binding
//!   ├── global    - Global, an alignment-honouring GlobalAlloc binding
//!   ├── counting  - Counting, an instrumented binding
//!   ├── logged    - Logged, a binding that reports through `log`
//!   ├── dispatch  - entry points and the palloc!/pfree! macro family
//!   └── block     - Block, a length-carrying owned array
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use tgalloc::{palloc, pfree};
//!
//! let mut nums: *mut i32 = std::ptr::null_mut();
//!
//! // The shape (40 bytes, aligned to 4) comes from the type of `nums`.
//! palloc!(nums, 10).expect("out of memory");
//!
//! unsafe {
//!   for i in 0..10 {
//!     *nums.add(i) = i as i32 * 10;
//!   }
//!   assert_eq!(*nums.add(9), 90);
//!
//!   pfree!(nums, 10);
//! }
//! ```
//!
//! ## Choosing a Binding
//!
//! ```text
//!   palloc!(slot)                 default binding, one element
//!   palloc!(slot, n)              default binding, n elements
//!   palloc!(in &binding; slot)    explicit binding, one element
//!   palloc!(in &binding; slot, n) explicit binding, n elements
//! ```
//!
//! The default binding is [`Heap`], or [`Global`] when the `aligned-default`
//! feature is enabled. Any other arity is rejected at compile time.
//!
//! ## Caller Contract
//!
//! Block sizes are not recorded. `free` and `reallocate` must be given the
//! element count the block was last sized at, which is why those entry points
//! are `unsafe`. [`Block`] carries its own length for callers who would
//! rather not track it.
//!
//! ## Limitations
//!
//! - **No overflow check**: `n * size_of::<T>()` must fit in `usize`.
//! - **Over-aligned types on `Heap`**: alignment beyond what `malloc`
//!   provides is undefined behaviour. Use [`Global`].
//! - **Thread safety** is whatever the binding provides.

mod binding;
mod block;
mod counting;
mod dispatch;
mod error;
mod global;
mod heap;
mod logged;
pub mod resolve;

pub use binding::Binding;
pub use block::Block;
pub use counting::{Counting, Stats};
pub use dispatch::{
  DefaultBinding, allocate_array, allocate_array_indirect, allocate_one, allocate_one_indirect,
  allocate_shape, default_binding, free_array, free_array_indirect, free_one, free_one_indirect,
  free_shape, reallocate_array, reallocate_array_indirect, reallocate_shape,
};
pub use error::AllocError;
pub use global::Global;
pub use heap::Heap;
pub use logged::Logged;
pub use resolve::{ResolverMode, Shape};
