//! Size and alignment resolution for storage locations.
//!
//! Every typed entry point resolves its [`Shape`] from the pointee type of
//! the slot it writes into, so callers never spell out a size or an
//! alignment.

use std::mem;

/// How a [`Shape`] was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolverMode {
  /// `size_of`/`align_of` of a concrete type.
  Native,
  /// Type of an expression, see [`Shape::of_val`]. Same numbers as
  /// [`Native`].
  ///
  /// [`Native`]: ResolverMode::Native
  CompilerTypeof,
  /// Type erased to a pointer-sized, pointer-aligned cell.
  Untyped,
  /// Size known, alignment approximated from it.
  SizeApproximated,
}

impl ResolverMode {
  /// Returns `true` when the mode keeps full type information.
  pub const fn is_type_safe(self) -> bool {
    matches!(self, Self::Native | Self::CompilerTypeof)
  }
}

/// The byte size and required alignment of one allocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
  size: usize,
  align: usize,
  mode: ResolverMode,
}

impl Shape {
  /// Resolves the shape of one `T`.
  ///
  /// ```rust
  /// use tgalloc::Shape;
  ///
  /// let shape = Shape::of::<u64>();
  /// assert_eq!(shape.size(), 8);
  /// assert_eq!(shape.align(), std::mem::align_of::<u64>());
  /// ```
  pub const fn of<T>() -> Self {
    Self {
      size: mem::size_of::<T>(),
      align: mem::align_of::<T>(),
      mode: ResolverMode::Native,
    }
  }

  /// Resolves the shape of `n` contiguous `T`s.
  pub const fn array<T>(n: usize) -> Self {
    Self::of::<T>().repeat(n)
  }

  /// Resolves the shape of the value a slot points at, without naming its
  /// type.
  pub const fn of_slot<T>(_slot: &*mut T) -> Self {
    Self::of::<T>()
  }

  /// Resolves the shape from the type of an expression, for call sites that
  /// hold a value but never name its type.
  pub const fn of_val<T>(_value: &T) -> Self {
    Self {
      mode: ResolverMode::CompilerTypeof,
      ..Self::of::<T>()
    }
  }

  /// A pointer-sized, pointer-aligned shape for callers that cannot name
  /// the type. Storage resolved this way must only hold pointer-sized data.
  #[deprecated(note = "untyped shape: type safety is lost, only pointer-sized data may be stored")]
  pub const fn untyped() -> Self {
    Self {
      size: mem::size_of::<*const ()>(),
      align: mem::align_of::<*const ()>(),
      mode: ResolverMode::Untyped,
    }
  }

  /// A shape of `size` bytes whose alignment is approximated as
  /// `min(size, size_of::<*const ()>())`.
  #[deprecated(note = "approximated alignment: over-aligned types are not supported")]
  pub const fn approximate(size: usize) -> Self {
    let ptr = mem::size_of::<*const ()>();

    Self {
      size,
      align: if size < ptr { size } else { ptr },
      mode: ResolverMode::SizeApproximated,
    }
  }

  /// Returns the shape of `n` consecutive elements of this shape.
  ///
  /// The multiplication is unchecked: keeping `size * n` within `usize` is
  /// the caller's responsibility.
  pub const fn repeat(
    self,
    n: usize,
  ) -> Self {
    Self {
      size: self.size * n,
      align: self.align,
      mode: self.mode,
    }
  }

  pub const fn size(&self) -> usize {
    self.size
  }

  pub const fn align(&self) -> usize {
    self.align
  }

  pub const fn mode(&self) -> ResolverMode {
    self.mode
  }
}

/// Byte size of one element of the slot's pointee type.
pub const fn size_of_one<T>(_slot: &*mut T) -> usize {
  mem::size_of::<T>()
}

/// Byte size of `n` elements of the slot's pointee type. Unchecked.
pub const fn size_of_n<T>(
  _slot: &*mut T,
  n: usize,
) -> usize {
  mem::size_of::<T>() * n
}

/// Required alignment of the slot's pointee type.
pub const fn alignment_of<T>(_slot: &*mut T) -> usize {
  mem::align_of::<T>()
}

/// Returns `true` if `ptr` is a multiple of `align`.
pub fn is_aligned_to<T>(
  ptr: *const T,
  align: usize,
) -> bool {
  align != 0 && (ptr as usize) % align == 0
}

#[cfg(test)]
mod tests {
  use std::ptr;

  use super::*;

  #[repr(C, align(32))]
  struct Wide {
    _bytes: [u8; 40],
  }

  #[test]
  fn test_slot_resolution() {
    let slot: *mut u16 = ptr::null_mut();

    assert_eq!(size_of_one(&slot), 2);
    assert_eq!(size_of_n(&slot, 7), 14);
    assert_eq!(alignment_of(&slot), mem::align_of::<u16>());
    assert_eq!(Shape::of_slot(&slot), Shape::of::<u16>());
  }

  #[test]
  fn test_over_aligned_type() {
    let slot: *mut Wide = ptr::null_mut();

    assert_eq!(alignment_of(&slot), 32);
    assert_eq!(size_of_one(&slot), 64);
    assert_eq!(Shape::array::<Wide>(3).size(), 192);
    assert_eq!(Shape::array::<Wide>(3).align(), 32);
  }

  #[test]
  fn test_zero_sized() {
    let slot: *mut () = ptr::null_mut();

    assert_eq!(size_of_n(&slot, 1000), 0);
    assert_eq!(alignment_of(&slot), 1);
  }

  #[test]
  fn test_of_val() {
    let sample = (1u8, 2u32);
    let shape = Shape::of_val(&sample);

    assert_eq!(shape.size(), mem::size_of::<(u8, u32)>());
    assert_eq!(shape.align(), mem::align_of::<(u8, u32)>());
    assert_eq!(shape.mode(), ResolverMode::CompilerTypeof);
    assert!(shape.mode().is_type_safe());
  }

  #[test]
  #[allow(deprecated)]
  fn test_degraded_modes() {
    let ptr_size = mem::size_of::<*const ()>();

    let untyped = Shape::untyped();
    assert_eq!(untyped.size(), ptr_size);
    assert_eq!(untyped.mode(), ResolverMode::Untyped);
    assert!(!untyped.mode().is_type_safe());

    assert_eq!(Shape::approximate(2).align(), 2);
    assert_eq!(Shape::approximate(3 * ptr_size).align(), ptr_size);
    assert_eq!(Shape::approximate(3 * ptr_size).repeat(2).size(), 6 * ptr_size);
    assert_eq!(
      Shape::approximate(1).mode(),
      ResolverMode::SizeApproximated
    );
  }

  #[test]
  fn test_is_aligned_to() {
    let value = 0u64;
    let addr = &value as *const u64;

    assert!(is_aligned_to(addr, mem::align_of::<u64>()));
    assert!(is_aligned_to(addr, 1));
    assert!(!is_aligned_to(addr, 0));
  }
}
