use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::{Binding, Heap};

/// A snapshot of a [`Counting`] binding's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
  /// Successful `allocate` calls.
  pub allocations: usize,
  /// Successful `reallocate` calls.
  pub reallocations: usize,
  /// Non-null `free` calls.
  pub frees: usize,
  /// Bytes handed out by `allocate`, summed over the binding's lifetime.
  pub bytes_allocated: usize,
  /// Bytes currently outstanding.
  pub live_bytes: usize,
  /// Blocks currently outstanding.
  pub live_allocations: usize,
}

/// An instrumented binding that counts calls and bytes, and can be forced to
/// fail.
///
/// Counters are updated from the sizes the caller passes in, so a mismatch
/// between the sizes used to allocate and to free a block shows up as a
/// non-zero [`Stats::live_bytes`] after everything has been released.
#[derive(Debug, Default)]
pub struct Counting<B = Heap> {
  inner: B,
  allocations: AtomicUsize,
  reallocations: AtomicUsize,
  frees: AtomicUsize,
  bytes_allocated: AtomicUsize,
  live_bytes: AtomicUsize,
  live_allocations: AtomicUsize,
  failing: AtomicBool,
}

impl<B: Binding> Counting<B> {
  pub const fn new(inner: B) -> Self {
    Self {
      inner,
      allocations: AtomicUsize::new(0),
      reallocations: AtomicUsize::new(0),
      frees: AtomicUsize::new(0),
      bytes_allocated: AtomicUsize::new(0),
      live_bytes: AtomicUsize::new(0),
      live_allocations: AtomicUsize::new(0),
      failing: AtomicBool::new(false),
    }
  }

  /// While set, every allocate and reallocate returns null without reaching
  /// the inner binding.
  pub fn set_failing(
    &self,
    failing: bool,
  ) {
    self.failing.store(failing, Ordering::Relaxed);
  }

  pub fn is_failing(&self) -> bool {
    self.failing.load(Ordering::Relaxed)
  }

  pub fn stats(&self) -> Stats {
    Stats {
      allocations: self.allocations.load(Ordering::Relaxed),
      reallocations: self.reallocations.load(Ordering::Relaxed),
      frees: self.frees.load(Ordering::Relaxed),
      bytes_allocated: self.bytes_allocated.load(Ordering::Relaxed),
      live_bytes: self.live_bytes.load(Ordering::Relaxed),
      live_allocations: self.live_allocations.load(Ordering::Relaxed),
    }
  }

  /// Clears every counter and the failure flag.
  pub fn reset(&self) {
    for counter in [
      &self.allocations,
      &self.reallocations,
      &self.frees,
      &self.bytes_allocated,
      &self.live_bytes,
      &self.live_allocations,
    ] {
      counter.store(0, Ordering::Relaxed);
    }
    self.set_failing(false);
  }

  pub fn inner(&self) -> &B {
    &self.inner
  }

  pub fn into_inner(self) -> B {
    self.inner
  }

  fn record_allocation(
    &self,
    size: usize,
  ) {
    self.allocations.fetch_add(1, Ordering::Relaxed);
    self.bytes_allocated.fetch_add(size, Ordering::Relaxed);
    self.live_bytes.fetch_add(size, Ordering::Relaxed);
    self.live_allocations.fetch_add(1, Ordering::Relaxed);
  }
}

unsafe impl<B: Binding> Binding for Counting<B> {
  fn allocate(
    &self,
    align: usize,
    size: usize,
  ) -> *mut u8 {
    if self.is_failing() {
      return std::ptr::null_mut();
    }

    let block = self.inner.allocate(align, size);
    if !block.is_null() {
      self.record_allocation(size);
    }
    block
  }

  unsafe fn reallocate(
    &self,
    ptr: *mut u8,
    align: usize,
    old_size: usize,
    new_size: usize,
  ) -> *mut u8 {
    if self.is_failing() {
      return std::ptr::null_mut();
    }

    if ptr.is_null() {
      return self.allocate(align, new_size);
    }

    let block = unsafe { self.inner.reallocate(ptr, align, old_size, new_size) };
    if !block.is_null() {
      self.reallocations.fetch_add(1, Ordering::Relaxed);
      self.live_bytes.fetch_sub(old_size, Ordering::Relaxed);
      self.live_bytes.fetch_add(new_size, Ordering::Relaxed);
    }
    block
  }

  unsafe fn free(
    &self,
    ptr: *mut u8,
    align: usize,
    size: usize,
  ) {
    if ptr.is_null() {
      return;
    }

    self.frees.fetch_add(1, Ordering::Relaxed);
    self.live_bytes.fetch_sub(size, Ordering::Relaxed);
    self.live_allocations.fetch_sub(1, Ordering::Relaxed);

    unsafe { self.inner.free(ptr, align, size) }
  }
}
