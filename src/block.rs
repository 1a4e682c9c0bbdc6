use std::{
  fmt,
  mem::{self, MaybeUninit},
  ptr::NonNull,
  slice,
};

use crate::{AllocError, Binding, allocate_array, free_array, reallocate_array};

/// An array of `T` that remembers its own length and binding.
///
/// Unlike the raw entry points, a `Block` frees itself with the length it was
/// last sized at, so the allocate/free size contract cannot be broken. The
/// binding is borrowed and therefore outlives the block.
///
/// Element values are never dropped; `Block` is storage for plain data.
pub struct Block<'a, T, B: Binding + ?Sized> {
  ptr: NonNull<T>,
  len: usize,
  binding: &'a B,
}

impl<'a, T, B: Binding + ?Sized> Block<'a, T, B> {
  /// Allocates uninitialized storage for `len` elements.
  pub fn new_in(
    binding: &'a B,
    len: usize,
  ) -> Result<Self, AllocError> {
    let mut slot = std::ptr::null_mut();
    let ptr = allocate_array(binding, &mut slot, len)?;

    Ok(Self { ptr, len, binding })
  }

  /// Allocates storage for `values.len()` elements and copies them in.
  pub fn from_slice_in(
    binding: &'a B,
    values: &[T],
  ) -> Result<Self, AllocError>
  where
    T: Copy,
  {
    let mut block = Self::new_in(binding, values.len())?;
    for (cell, value) in block.as_uninit_slice_mut().iter_mut().zip(values) {
      cell.write(*value);
    }
    Ok(block)
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn binding(&self) -> &'a B {
    self.binding
  }

  pub fn as_ptr(&self) -> *const T {
    self.ptr.as_ptr()
  }

  pub fn as_mut_ptr(&mut self) -> *mut T {
    self.ptr.as_ptr()
  }

  pub fn as_uninit_slice_mut(&mut self) -> &mut [MaybeUninit<T>] {
    unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr() as *mut MaybeUninit<T>, self.len) }
  }

  /// # Safety
  ///
  /// Every element must have been initialized.
  pub unsafe fn as_slice(&self) -> &[T] {
    unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
  }

  /// # Safety
  ///
  /// Every element must have been initialized.
  pub unsafe fn as_mut_slice(&mut self) -> &mut [T] {
    unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
  }

  /// Resizes to `new_len` elements, keeping the first `min(len, new_len)`.
  ///
  /// On failure the block is left exactly as it was.
  pub fn resize(
    &mut self,
    new_len: usize,
  ) -> Result<(), AllocError> {
    let mut slot = self.ptr.as_ptr();
    self.ptr = unsafe { reallocate_array(self.binding, &mut slot, self.len, new_len) }?;
    self.len = new_len;
    Ok(())
  }

  /// Gives up ownership, returning the pointer and length to free with.
  pub fn into_raw(self) -> (NonNull<T>, usize) {
    let parts = (self.ptr, self.len);
    mem::forget(self);
    parts
  }

  /// Takes ownership of a block allocated through `binding`.
  ///
  /// # Safety
  ///
  /// `ptr` must be a live block allocated through `binding` for exactly
  /// `len` elements of `T`.
  pub unsafe fn from_raw_in(
    binding: &'a B,
    ptr: NonNull<T>,
    len: usize,
  ) -> Self {
    Self { ptr, len, binding }
  }
}

impl<T, B: Binding + ?Sized> Drop for Block<'_, T, B> {
  fn drop(&mut self) {
    unsafe { free_array(self.binding, self.ptr.as_ptr(), self.len) }
  }
}

impl<T, B: Binding + ?Sized> fmt::Debug for Block<'_, T, B> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("Block")
      .field("ptr", &self.ptr)
      .field("len", &self.len)
      .finish()
  }
}

unsafe impl<T: Send, B: Binding + Sync + ?Sized> Send for Block<'_, T, B> {}
unsafe impl<T: Sync, B: Binding + Sync + ?Sized> Sync for Block<'_, T, B> {}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Counting, Heap};

  #[test]
  fn test_frees_with_recorded_length() {
    let counting = Counting::new(Heap);

    {
      let mut block = Block::<u32, _>::new_in(&counting, 4).unwrap();
      for (i, cell) in block.as_uninit_slice_mut().iter_mut().enumerate() {
        cell.write(i as u32);
      }

      block.resize(9).unwrap();
      assert_eq!(block.len(), 9);
      assert_eq!(counting.stats().live_bytes, 36);

      block.resize(2).unwrap();
      assert_eq!(unsafe { block.as_slice() }, &[0, 1]);
    }

    let stats = counting.stats();
    assert_eq!(stats.frees, 1);
    assert_eq!(stats.live_bytes, 0);
    assert_eq!(stats.live_allocations, 0);
  }

  #[test]
  fn test_failed_resize_leaves_block() {
    let counting = Counting::new(Heap);
    let mut block = Block::from_slice_in(&counting, &[1.5f64, 2.5, 3.5]).unwrap();

    counting.set_failing(true);
    assert!(block.resize(1000).is_err());
    counting.set_failing(false);

    assert_eq!(block.len(), 3);
    assert_eq!(unsafe { block.as_slice() }, &[1.5, 2.5, 3.5]);

    drop(block);
    assert_eq!(counting.stats().live_bytes, 0);
  }

  #[test]
  fn test_resize_to_zero() {
    let counting = Counting::new(Heap);

    {
      let mut block = Block::from_slice_in(&counting, &[4u32, 5, 6, 7]).unwrap();

      block.resize(0).unwrap();
      assert!(block.is_empty());
      assert_eq!(counting.stats().reallocations, 1);
      assert_eq!(counting.stats().live_bytes, 0);

      block.resize(2).unwrap();
      for cell in block.as_uninit_slice_mut() {
        cell.write(9);
      }
      assert_eq!(unsafe { block.as_slice() }, &[9, 9]);
    }

    let stats = counting.stats();
    assert_eq!(stats.frees, 1);
    assert_eq!(stats.live_allocations, 0);
    assert_eq!(stats.live_bytes, 0);

    let mut plain = Block::<u64, _>::new_in(&Heap, 4).unwrap();
    plain.resize(0).unwrap();
    assert_eq!(plain.len(), 0);
    drop(plain);
  }

  #[test]
  fn test_new_in_failure() {
    let counting = Counting::new(Heap);
    counting.set_failing(true);

    let err = Block::<u64, _>::new_in(&counting, 5).unwrap_err();
    assert_eq!(err, AllocError::Exhausted { size: 40, align: 8 });
  }

  #[test]
  fn test_into_raw_round_trip() {
    let counting = Counting::new(Heap);
    let block = Block::from_slice_in(&counting, &[7u8, 8, 9]).unwrap();

    let (ptr, len) = block.into_raw();
    assert_eq!(counting.stats().frees, 0);

    let mut block = unsafe { Block::from_raw_in(&counting, ptr, len) };
    unsafe { block.as_mut_slice()[0] = 1 };
    assert_eq!(unsafe { block.as_slice() }, &[1, 8, 9]);

    drop(block);
    assert_eq!(counting.stats().frees, 1);
  }
}
