use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the wall-clock timestamps records are expired against.
///
/// Records persist absolute expiration times, so the clock is an injectable
/// seam: production code uses `SystemClock`, tests substitute a manual one to
/// simulate the passage of arbitrary amounts of time.
pub trait Clock: Send + Sync {
  /// The current time as whole seconds since the Unix epoch.
  fn epoch_secs(&self) -> i64;
}

/// The default clock, backed by `SystemTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn epoch_secs(&self) -> i64 {
    SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|elapsed| elapsed.as_secs() as i64)
      .unwrap_or(0)
  }
}
