use std::{rc::Rc, sync::Arc};

/// A triple of allocate, reallocate and free operations sharing one
/// instance.
///
/// The instance handle is `&self`. A binding communicates failure only
/// through a null return; it must not panic or abort on exhaustion.
///
/// # Safety
///
/// Implementors must uphold the following:
///
/// - `allocate` returns null or a block of at least `size` bytes aligned to
///   at least `align`, valid until it is freed or reallocated away.
/// - `reallocate` with a null `ptr` behaves like `allocate`. Otherwise, on
///   success, the leading `min(old_size, new_size)` bytes of the new block
///   equal those of the old block and the old block is invalidated; on
///   failure it returns null and leaves the old block valid and unchanged.
/// - `free` with a null `ptr` does nothing.
pub unsafe trait Binding {
  /// Returns a fresh, uninitialized block or null.
  fn allocate(
    &self,
    align: usize,
    size: usize,
  ) -> *mut u8;

  /// Resizes a block, returning the new block or null.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or a live block produced by this binding, last sized
  /// at `old_size` bytes with alignment `align`.
  unsafe fn reallocate(
    &self,
    ptr: *mut u8,
    align: usize,
    old_size: usize,
    new_size: usize,
  ) -> *mut u8;

  /// Releases a block.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or a live block produced by this binding, last sized
  /// at `size` bytes with alignment `align`.
  unsafe fn free(
    &self,
    ptr: *mut u8,
    align: usize,
    size: usize,
  );
}

macro_rules! forward_binding {
  ($($ty:ty),* $(,)?) => {
    $(
      unsafe impl<B: Binding + ?Sized> Binding for $ty {
        fn allocate(
          &self,
          align: usize,
          size: usize,
        ) -> *mut u8 {
          (**self).allocate(align, size)
        }

        unsafe fn reallocate(
          &self,
          ptr: *mut u8,
          align: usize,
          old_size: usize,
          new_size: usize,
        ) -> *mut u8 {
          unsafe { (**self).reallocate(ptr, align, old_size, new_size) }
        }

        unsafe fn free(
          &self,
          ptr: *mut u8,
          align: usize,
          size: usize,
        ) {
          unsafe { (**self).free(ptr, align, size) }
        }
      }
    )*
  };
}

forward_binding!(&B, &mut B, Box<B>, Rc<B>, Arc<B>);

#[cfg(test)]
mod tests {
  use std::ptr;

  use super::*;
  use crate::Heap;

  fn round_trip<B: Binding>(binding: B) {
    let block = binding.allocate(8, 16) as *mut u64;
    assert!(!block.is_null());

    unsafe {
      block.write(7);
      block.add(1).write(9);

      let grown = binding.reallocate(block as *mut u8, 8, 16, 32) as *mut u64;
      assert!(!grown.is_null());
      assert_eq!(*grown, 7);
      assert_eq!(*grown.add(1), 9);

      binding.free(grown as *mut u8, 8, 32);
    }
  }

  #[test]
  fn test_forwarding_impls() {
    let heap = Heap;

    round_trip(&heap);
    round_trip(Box::new(Heap));
    round_trip(Rc::new(Heap));
    round_trip(Arc::new(Heap));

    let boxed: Box<dyn Binding> = Box::new(Heap);
    round_trip(&*boxed);
  }

  #[test]
  fn test_null_reallocate_allocates() {
    let heap = Heap;

    unsafe {
      let block = heap.reallocate(ptr::null_mut(), 4, 0, 12);
      assert!(!block.is_null());
      heap.free(block, 4, 12);
      heap.free(ptr::null_mut(), 4, 12);
    }
  }
}
