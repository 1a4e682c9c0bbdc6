use log::{trace, warn};

use crate::Binding;

const TARGET: &str = "tgalloc";

/// A binding adapter that reports every operation through the `log` facade.
///
/// Successful calls are logged at `trace`, null results at `warn`. Nothing is
/// emitted unless the application installs a logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logged<B> {
  inner: B,
  name: &'static str,
}

impl<B: Binding> Logged<B> {
  pub const fn new(inner: B) -> Self {
    Self::named("binding", inner)
  }

  /// Tags every record with `name` so several bindings can be told apart.
  pub const fn named(
    name: &'static str,
    inner: B,
  ) -> Self {
    Self { inner, name }
  }

  pub fn inner(&self) -> &B {
    &self.inner
  }

  pub fn into_inner(self) -> B {
    self.inner
  }
}

unsafe impl<B: Binding> Binding for Logged<B> {
  fn allocate(
    &self,
    align: usize,
    size: usize,
  ) -> *mut u8 {
    let block = self.inner.allocate(align, size);

    if block.is_null() {
      warn!(target: TARGET, "{}: allocate size={size} align={align} failed", self.name);
    } else {
      trace!(target: TARGET, "{}: allocate size={size} align={align} -> {block:?}", self.name);
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
    let block = unsafe { self.inner.reallocate(ptr, align, old_size, new_size) };

    if block.is_null() {
      warn!(
        target: TARGET,
        "{}: reallocate {ptr:?} size={old_size}->{new_size} align={align} failed",
        self.name
      );
    } else {
      trace!(
        target: TARGET,
        "{}: reallocate {ptr:?} size={old_size}->{new_size} align={align} -> {block:?}",
        self.name
      );
    }
    block
  }

  unsafe fn free(
    &self,
    ptr: *mut u8,
    align: usize,
    size: usize,
  ) {
    trace!(target: TARGET, "{}: free {ptr:?} size={size} align={align}", self.name);

    unsafe { self.inner.free(ptr, align, size) }
  }
}

#[cfg(test)]
mod tests {
  use std::{
    cell::RefCell,
    sync::Once,
  };

  use log::{Level, LevelFilter, Log, Metadata, Record};

  use super::*;
  use crate::{Counting, Heap};

  thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
  }

  struct Capture;

  impl Log for Capture {
    fn enabled(
      &self,
      metadata: &Metadata<'_>,
    ) -> bool {
      metadata.target() == TARGET
    }

    fn log(
      &self,
      record: &Record<'_>,
    ) {
      if self.enabled(record.metadata()) {
        RECORDS.with(|records| {
          records
            .borrow_mut()
            .push((record.level(), record.args().to_string()))
        });
      }
    }

    fn flush(&self) {}
  }

  static CAPTURE: Capture = Capture;
  static INIT: Once = Once::new();

  fn captured() -> Vec<(Level, String)> {
    INIT.call_once(|| {
      let _ = log::set_logger(&CAPTURE);
      log::set_max_level(LevelFilter::Trace);
    });
    RECORDS.with(|records| records.borrow_mut().drain(..).collect())
  }

  #[test]
  fn test_logs_each_operation() {
    captured();
    let logged = Logged::named("heap", Heap);

    let block = logged.allocate(8, 32);
    assert!(!block.is_null());
    unsafe {
      let block = logged.reallocate(block, 8, 32, 48);
      logged.free(block, 8, 48);
    }

    let records = captured();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|(level, _)| *level == Level::Trace));
    assert!(records[0].1.starts_with("heap: allocate size=32 align=8"));
    assert!(records[1].1.contains("size=32->48"));
    assert!(records[2].1.starts_with("heap: free"));
  }

  #[test]
  fn test_warns_on_failure() {
    captured();
    let counting = Counting::new(Heap);
    counting.set_failing(true);
    let logged = Logged::new(&counting);

    assert!(logged.allocate(4, 20).is_null());

    let records = captured();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, Level::Warn);
    assert_eq!(records[0].1, "binding: allocate size=20 align=4 failed");
  }
}
