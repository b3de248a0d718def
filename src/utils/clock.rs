use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

static START: Lazy<Instant> = Lazy::new(Instant::now);
static LAST: AtomicU64 = AtomicU64::new(0);

/// Монотонная метка времени в наносекундах от старта процесса.
/// Строго возрастает между любыми двумя вызовами: два синтезированных
/// события повтора никогда не получают одинаковое время.
pub fn monotonic_timestamp() -> u64 {
    let now = START.elapsed().as_nanos() as u64;
    let mut prev = LAST.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => prev = observed,
        }
    }
}
