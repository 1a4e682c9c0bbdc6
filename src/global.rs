use std::{
  alloc::{GlobalAlloc, Layout, System},
  ptr,
};

use crate::Binding;

/// A binding over any [`GlobalAlloc`] that honours the requested alignment.
///
/// Requests that do not form a valid [`Layout`] (alignment not a power of
/// two, size overflowing `isize` once padded) fail with null. Zero-size
/// requests never reach the inner allocator: they return a dangling pointer
/// aligned to `align`, and freeing one is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct Global<A = System> {
  inner: A,
}

impl Global<System> {
  pub const fn system() -> Self {
    Self { inner: System }
  }
}

impl<A: GlobalAlloc> Global<A> {
  pub const fn new(inner: A) -> Self {
    Self { inner }
  }

  pub fn inner(&self) -> &A {
    &self.inner
  }
}

fn dangling(align: usize) -> *mut u8 {
  ptr::without_provenance_mut(align)
}

unsafe impl<A: GlobalAlloc> Binding for Global<A> {
  fn allocate(
    &self,
    align: usize,
    size: usize,
  ) -> *mut u8 {
    let Ok(layout) = Layout::from_size_align(size, align) else {
      return ptr::null_mut();
    };

    if size == 0 {
      return dangling(align);
    }

    unsafe { self.inner.alloc(layout) }
  }

  unsafe fn reallocate(
    &self,
    ptr: *mut u8,
    align: usize,
    old_size: usize,
    new_size: usize,
  ) -> *mut u8 {
    if ptr.is_null() || old_size == 0 {
      return self.allocate(align, new_size);
    }

    let Ok(old_layout) = Layout::from_size_align(old_size, align) else {
      return ptr::null_mut();
    };

    if Layout::from_size_align(new_size, align).is_err() {
      return ptr::null_mut();
    }

    if new_size == 0 {
      unsafe { self.inner.dealloc(ptr, old_layout) };
      return dangling(align);
    }

    unsafe { self.inner.realloc(ptr, old_layout, new_size) }
  }

  unsafe fn free(
    &self,
    ptr: *mut u8,
    align: usize,
    size: usize,
  ) {
    if ptr.is_null() || size == 0 {
      return;
    }

    // A live block was allocated with this exact layout.
    unsafe {
      self
        .inner
        .dealloc(ptr, Layout::from_size_align_unchecked(size, align))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::resolve::is_aligned_to;

  #[test]
  fn test_honours_alignment() {
    let global = Global::system();

    for shift in 0..12 {
      let align = 1usize << shift;
      let block = global.allocate(align, 24);

      assert!(!block.is_null());
      assert!(is_aligned_to(block, align));

      unsafe { global.free(block, align, 24) };
    }
  }

  #[test]
  fn test_invalid_layout_is_null() {
    let global = Global::system();

    assert!(global.allocate(3, 16).is_null());
    assert!(global.allocate(0, 16).is_null());
    assert!(global.allocate(8, usize::MAX - 2).is_null());
  }

  #[test]
  fn test_zero_size() {
    let global = Global::system();

    let block = global.allocate(64, 0);
    assert_eq!(block as usize, 64);

    unsafe {
      let grown = global.reallocate(block, 64, 0, 128);
      assert!(!grown.is_null());
      assert!(is_aligned_to(grown, 64));

      grown.write_bytes(0x5a, 128);

      let empty = global.reallocate(grown, 64, 128, 0);
      assert_eq!(empty as usize, 64);

      global.free(empty, 64, 0);
    }
  }

  #[test]
  fn test_over_aligned_grow() {
    let global = Global::system();

    unsafe {
      let block = global.allocate(256, 32);
      assert!(is_aligned_to(block, 256));
      block.write_bytes(0x11, 32);

      let grown = global.reallocate(block, 256, 32, 4096);
      assert!(is_aligned_to(grown, 256));
      assert_eq!(grown.add(31).read(), 0x11);

      global.free(grown, 256, 4096);
    }
  }
}
