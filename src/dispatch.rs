//! Typed entry points over a [`Binding`].
//!
//! Each entry point resolves the size and alignment from the slot's pointee
//! type, calls exactly one binding operation, and writes the result back into
//! the slot. Nothing here logs, retries or panics.

use std::ptr::{self, NonNull};

use crate::{AllocError, Binding, resolve::Shape};

#[cfg(not(feature = "aligned-default"))]
pub type DefaultBinding = crate::Heap;

#[cfg(feature = "aligned-default")]
pub type DefaultBinding = crate::Global;

#[cfg(not(feature = "aligned-default"))]
static DEFAULT: DefaultBinding = crate::Heap::new();

#[cfg(feature = "aligned-default")]
static DEFAULT: DefaultBinding = crate::Global::system();

/// The binding the macros use when no `in <binding>;` prefix is given.
pub fn default_binding() -> &'static DefaultBinding {
  &DEFAULT
}

/// Allocates a block of an explicitly resolved [`Shape`] into `slot`.
///
/// This is the entry point for shapes the slot type cannot describe, such as
/// [`Shape::untyped`] or [`Shape::approximate`]. Failure nulls `slot`.
pub fn allocate_shape<T, B: Binding + ?Sized>(
  binding: &B,
  slot: &mut *mut T,
  shape: Shape,
) -> Result<NonNull<T>, AllocError> {
  let block = binding.allocate(shape.align(), shape.size()) as *mut T;
  *slot = block;

  NonNull::new(block).ok_or(AllocError::Exhausted {
    size: shape.size(),
    align: shape.align(),
  })
}

/// Allocates storage for one `T` into `slot`.
///
/// On failure `slot` is set to null and an error is returned. The memory is
/// uninitialized.
///
/// ```rust
/// use tgalloc::{Heap, allocate_one, free_one};
///
/// let mut point: *mut (i32, i32) = std::ptr::null_mut();
/// allocate_one(&Heap, &mut point).unwrap();
///
/// unsafe {
///   point.write((10, 20));
///   assert_eq!((*point).1, 20);
///   free_one(&Heap, point);
/// }
/// ```
pub fn allocate_one<T, B: Binding + ?Sized>(
  binding: &B,
  slot: &mut *mut T,
) -> Result<NonNull<T>, AllocError> {
  allocate_shape(binding, slot, Shape::of::<T>())
}

/// Allocates storage for `n` contiguous `T`s into `slot`.
///
/// `n * size_of::<T>()` is not checked for overflow.
pub fn allocate_array<T, B: Binding + ?Sized>(
  binding: &B,
  slot: &mut *mut T,
  n: usize,
) -> Result<NonNull<T>, AllocError> {
  allocate_shape(binding, slot, Shape::array::<T>(n))
}

/// Resizes the array in `slot` from `old_n` to `new_n` elements.
///
/// The first `min(old_n, new_n)` elements are preserved. On failure `slot`
/// keeps the original block, which is still valid and must still be freed
/// with `old_n`.
///
/// # Safety
///
/// `*slot` must be null or a live block allocated through `binding` for
/// exactly `old_n` elements of `T`.
pub unsafe fn reallocate_array<T, B: Binding + ?Sized>(
  binding: &B,
  slot: &mut *mut T,
  old_n: usize,
  new_n: usize,
) -> Result<NonNull<T>, AllocError> {
  unsafe { reallocate_shape(binding, slot, Shape::array::<T>(old_n), Shape::array::<T>(new_n)) }
}

/// Resizes a block in `slot` from the `old` shape to the `new` one.
///
/// Failure leaves `slot` holding the original block.
///
/// # Safety
///
/// `*slot` must be null or a live block allocated through `binding` at
/// `old`, and `new` must have the same alignment as `old`.
pub unsafe fn reallocate_shape<T, B: Binding + ?Sized>(
  binding: &B,
  slot: &mut *mut T,
  old: Shape,
  new: Shape,
) -> Result<NonNull<T>, AllocError> {
  let block = unsafe { binding.reallocate(*slot as *mut u8, old.align(), old.size(), new.size()) } as *mut T;

  match NonNull::new(block) {
    Some(block) => {
      *slot = block.as_ptr();
      Ok(block)
    }
    None => Err(AllocError::Reallocate {
      align: old.align(),
      old_size: old.size(),
      new_size: new.size(),
    }),
  }
}

/// Releases a block allocated at `shape`.
///
/// # Safety
///
/// `ptr` must be null or a live block allocated (or last reallocated)
/// through `binding` at exactly `shape`.
pub unsafe fn free_shape<T, B: Binding + ?Sized>(
  binding: &B,
  ptr: *mut T,
  shape: Shape,
) {
  unsafe { binding.free(ptr as *mut u8, shape.align(), shape.size()) }
}

/// Releases one `T`. A null `ptr` is a no-op for conforming bindings.
///
/// # Safety
///
/// `ptr` must be null or a live block allocated through `binding` for one
/// `T`. It must not be used afterwards.
pub unsafe fn free_one<T, B: Binding + ?Sized>(
  binding: &B,
  ptr: *mut T,
) {
  unsafe { free_shape(binding, ptr, Shape::of::<T>()) }
}

/// Releases an array of `n` `T`s.
///
/// # Safety
///
/// `ptr` must be null or a live block allocated (or last reallocated)
/// through `binding` for exactly `n` elements of `T`.
pub unsafe fn free_array<T, B: Binding + ?Sized>(
  binding: &B,
  ptr: *mut T,
  n: usize,
) {
  unsafe { free_shape(binding, ptr, Shape::array::<T>(n)) }
}

/// [`allocate_one`] through a pointer to the slot, for out-parameters.
///
/// # Safety
///
/// `pptr` must be non-null, aligned, and valid for reads and writes.
pub unsafe fn allocate_one_indirect<T, B: Binding + ?Sized>(
  binding: &B,
  pptr: *mut *mut T,
) -> Result<NonNull<T>, AllocError> {
  allocate_one(binding, unsafe { &mut *pptr })
}

/// [`allocate_array`] through a pointer to the slot.
///
/// # Safety
///
/// As for [`allocate_one_indirect`].
pub unsafe fn allocate_array_indirect<T, B: Binding + ?Sized>(
  binding: &B,
  pptr: *mut *mut T,
  n: usize,
) -> Result<NonNull<T>, AllocError> {
  allocate_array(binding, unsafe { &mut *pptr }, n)
}

/// [`reallocate_array`] through a pointer to the slot.
///
/// # Safety
///
/// `pptr` must be valid as for [`allocate_one_indirect`], and `*pptr` must
/// satisfy the requirements of [`reallocate_array`].
pub unsafe fn reallocate_array_indirect<T, B: Binding + ?Sized>(
  binding: &B,
  pptr: *mut *mut T,
  old_n: usize,
  new_n: usize,
) -> Result<NonNull<T>, AllocError> {
  unsafe { reallocate_array(binding, &mut *pptr, old_n, new_n) }
}

/// [`free_one`] through a pointer to the slot. The slot is reset to null.
///
/// # Safety
///
/// `pptr` must be valid as for [`allocate_one_indirect`], and `*pptr` must
/// satisfy the requirements of [`free_one`].
pub unsafe fn free_one_indirect<T, B: Binding + ?Sized>(
  binding: &B,
  pptr: *mut *mut T,
) {
  unsafe {
    free_one(binding, *pptr);
    *pptr = ptr::null_mut();
  }
}

/// [`free_array`] through a pointer to the slot. The slot is reset to null.
///
/// # Safety
///
/// `pptr` must be valid as for [`allocate_one_indirect`], and `*pptr` must
/// satisfy the requirements of [`free_array`].
pub unsafe fn free_array_indirect<T, B: Binding + ?Sized>(
  binding: &B,
  pptr: *mut *mut T,
  n: usize,
) {
  unsafe {
    free_array(binding, *pptr, n);
    *pptr = ptr::null_mut();
  }
}

/// Allocates into a `*mut T` place, one element or `n`.
///
/// ```rust
/// use tgalloc::{Counting, Heap, palloc, pfree};
///
/// let counting = Counting::new(Heap);
/// let mut nums: *mut i32 = std::ptr::null_mut();
///
/// palloc!(in &counting; nums, 10).unwrap();
/// assert_eq!(counting.stats().bytes_allocated, 40);
///
/// unsafe { pfree!(in &counting; nums, 10) };
/// assert_eq!(counting.stats().live_bytes, 0);
/// ```
///
/// Without an `in <binding>;` prefix the [default binding](crate::default_binding)
/// is used. Any other argument count fails to compile.
#[macro_export]
macro_rules! palloc {
  (in $binding:expr; $slot:expr) => {
    $crate::allocate_one($binding, &mut $slot)
  };
  (in $binding:expr; $slot:expr, $len:expr) => {
    $crate::allocate_array($binding, &mut $slot, $len)
  };
  ($slot:expr) => {
    $crate::palloc!(in $crate::default_binding(); $slot)
  };
  ($slot:expr, $len:expr) => {
    $crate::palloc!(in $crate::default_binding(); $slot, $len)
  };
}

/// Frees a pointer allocated with [`palloc!`]. Expands to an unsafe call.
#[macro_export]
macro_rules! pfree {
  (in $binding:expr; $ptr:expr) => {
    $crate::free_one($binding, $ptr)
  };
  (in $binding:expr; $ptr:expr, $len:expr) => {
    $crate::free_array($binding, $ptr, $len)
  };
  ($ptr:expr) => {
    $crate::pfree!(in $crate::default_binding(); $ptr)
  };
  ($ptr:expr, $len:expr) => {
    $crate::pfree!(in $crate::default_binding(); $ptr, $len)
  };
}

/// Resizes an array place from `old` to `new` elements. Expands to an unsafe
/// call.
#[macro_export]
macro_rules! prealloc {
  (in $binding:expr; $slot:expr, $old:expr, $new:expr) => {
    $crate::reallocate_array($binding, &mut $slot, $old, $new)
  };
  ($slot:expr, $old:expr, $new:expr) => {
    $crate::prealloc!(in $crate::default_binding(); $slot, $old, $new)
  };
}

/// [`palloc!`] through a `*mut *mut T`. Expands to an unsafe call.
#[macro_export]
macro_rules! ppalloc {
  (in $binding:expr; $pptr:expr) => {
    $crate::allocate_one_indirect($binding, $pptr)
  };
  (in $binding:expr; $pptr:expr, $len:expr) => {
    $crate::allocate_array_indirect($binding, $pptr, $len)
  };
  ($pptr:expr) => {
    $crate::ppalloc!(in $crate::default_binding(); $pptr)
  };
  ($pptr:expr, $len:expr) => {
    $crate::ppalloc!(in $crate::default_binding(); $pptr, $len)
  };
}

/// [`prealloc!`] through a `*mut *mut T`. Expands to an unsafe call.
#[macro_export]
macro_rules! pprealloc {
  (in $binding:expr; $pptr:expr, $old:expr, $new:expr) => {
    $crate::reallocate_array_indirect($binding, $pptr, $old, $new)
  };
  ($pptr:expr, $old:expr, $new:expr) => {
    $crate::pprealloc!(in $crate::default_binding(); $pptr, $old, $new)
  };
}

/// [`pfree!`] through a `*mut *mut T`, nulling the slot. Expands to an unsafe
/// call.
#[macro_export]
macro_rules! ppfree {
  (in $binding:expr; $pptr:expr) => {
    $crate::free_one_indirect($binding, $pptr)
  };
  (in $binding:expr; $pptr:expr, $len:expr) => {
    $crate::free_array_indirect($binding, $pptr, $len)
  };
  ($pptr:expr) => {
    $crate::ppfree!(in $crate::default_binding(); $pptr)
  };
  ($pptr:expr, $len:expr) => {
    $crate::ppfree!(in $crate::default_binding(); $pptr, $len)
  };
}
