use std::{mem, ptr};

use tgalloc::{Counting, Global, Heap, Stats, palloc, pfree, prealloc};

/// Prints what the binding has seen so far.
fn print_stats(
  label: &str,
  stats: Stats,
) {
  println!(
    "[{}] allocations = {}, reallocations = {}, frees = {}, live bytes = {}, live blocks = {}",
    label,
    stats.allocations,
    stats.reallocations,
    stats.frees,
    stats.live_bytes,
    stats.live_allocations,
  );
}

#[repr(C, align(64))]
struct CacheLine {
  words: [u64; 8],
}

fn main() {
  // Every call below names the binding it goes through. The sizes and
  // alignments all come from the slot types.
  let counting = Counting::new(Heap);

  // --------------------------------------------------------------------
  // 1) One u32 through the counting binding.
  // --------------------------------------------------------------------
  let mut value: *mut u32 = ptr::null_mut();
  if let Err(err) = palloc!(in &counting; value) {
    eprintln!("[1] {err}");
    return;
  }

  unsafe {
    value.write(0xDEADBEEF);
    println!("\n[1] Allocated u32 at {:?}, value = 0x{:X}", value, value.read());
  }
  print_stats("1", counting.stats());

  // --------------------------------------------------------------------
  // 2) Ten f64s, then grow them to sixteen.
  // --------------------------------------------------------------------
  let mut samples: *mut f64 = ptr::null_mut();
  let mut samples_len = 10;
  if let Err(err) = palloc!(in &counting; samples, samples_len) {
    eprintln!("[2] {err}");
    return;
  }

  unsafe {
    for i in 0..10 {
      samples.add(i).write(i as f64 * 0.5);
    }

    match prealloc!(in &counting; samples, 10, 16) {
      Ok(_) => {
        samples_len = 16;
        println!("\n[2] Grew samples to 16, samples[9] = {}", samples.add(9).read());
      }
      Err(err) => println!("\n[2] {err}, samples still holds 10 elements"),
    }
  }
  print_stats("2", counting.stats());

  // --------------------------------------------------------------------
  // 3) Force the binding to fail. The slot comes back null.
  // --------------------------------------------------------------------
  counting.set_failing(true);
  let mut doomed: *mut u64 = ptr::null_mut();
  match palloc!(in &counting; doomed, 5) {
    Ok(_) => println!("\n[3] Unexpected success"),
    Err(err) => println!("\n[3] {err}, slot is null: {}", doomed.is_null()),
  }
  counting.set_failing(false);

  // --------------------------------------------------------------------
  // 4) Over-aligned type through the alignment-honouring binding.
  // --------------------------------------------------------------------
  let global = Global::system();
  let mut line: *mut CacheLine = ptr::null_mut();
  if palloc!(in &global; line).is_ok() {
    let addr = line as usize;
    println!(
      "\n[4] CacheLine at {:#X}, addr % align = {}",
      addr,
      addr % mem::align_of::<CacheLine>()
    );
    unsafe {
      line.write(CacheLine { words: [7; 8] });
      println!("[4] words[7] = {}", (*line).words[7]);
      pfree!(in &global; line);
    }
  }

  // --------------------------------------------------------------------
  // 5) Release everything with the sizes it was last allocated at.
  // --------------------------------------------------------------------
  unsafe {
    pfree!(in &counting; value);
    pfree!(in &counting; samples, samples_len);
  }
  println!();
  print_stats("5", counting.stats());
}
