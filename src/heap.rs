use libc::{c_void, free, malloc, realloc};

use crate::Binding;

/// The default binding: thin passthroughs to the platform `malloc`,
/// `realloc` and `free`.
///
/// `Heap` carries no state. Alignment is not forwarded to the platform
/// allocator, so blocks are only aligned to whatever `malloc` guarantees
/// (16 bytes on common 64 bit targets). Over-aligned types are not
/// supported; use [`Global`](crate::Global) for those.
///
/// Zero-size requests are rounded up to one byte, so a null from
/// `reallocate` always leaves the old block live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Heap;

impl Heap {
  pub const fn new() -> Self {
    Self
  }
}

unsafe impl Binding for Heap {
  fn allocate(
    &self,
    _align: usize,
    size: usize,
  ) -> *mut u8 {
    unsafe { malloc(size.max(1)) as *mut u8 }
  }

  unsafe fn reallocate(
    &self,
    ptr: *mut u8,
    _align: usize,
    _old_size: usize,
    new_size: usize,
  ) -> *mut u8 {
    unsafe { realloc(ptr as *mut c_void, new_size.max(1)) as *mut u8 }
  }

  unsafe fn free(
    &self,
    ptr: *mut u8,
    _align: usize,
    _size: usize,
  ) {
    unsafe { free(ptr as *mut c_void) }
  }
}
