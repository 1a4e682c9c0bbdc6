use thiserror::Error;

/// A binding returned null for an allocation request.
///
/// The slot an entry point wrote into is null after an `Exhausted` error and
/// still holds the original block after a `Reallocate` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
  #[error("allocation of {size} bytes aligned to {align} failed")]
  Exhausted { size: usize, align: usize },

  #[error("reallocation from {old_size} to {new_size} bytes aligned to {align} failed")]
  Reallocate {
    align: usize,
    old_size: usize,
    new_size: usize,
  },
}

impl AllocError {
  /// The number of bytes that could not be provided.
  pub fn requested(&self) -> usize {
    match *self {
      Self::Exhausted { size, .. } => size,
      Self::Reallocate { new_size, .. } => new_size,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_display() {
    let err = AllocError::Exhausted { size: 40, align: 4 };
    assert_eq!(err.to_string(), "allocation of 40 bytes aligned to 4 failed");
    assert_eq!(err.requested(), 40);

    let err = AllocError::Reallocate {
      align: 8,
      old_size: 40,
      new_size: 64,
    };
    assert_eq!(
      err.to_string(),
      "reallocation from 40 to 64 bytes aligned to 8 failed"
    );
    assert_eq!(err.requested(), 64);
  }
}
