use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::adapter::{self, Backend};
use crate::clock::{Clock, SystemClock};
use crate::diag::{Diagnostics, TracingDiagnostics};
use crate::error::StorageError;
use crate::handles::Storage;
use crate::memory::MemoryCache;
use crate::params::{RefillArgs, RefillFn};
use crate::record::Expires;
use crate::refill::RefillCoordinator;
use crate::shared::StorageShared;
use crate::task::sweeper::Sweeper;
use crate::whitelist::WhiteList;

/// Default TTL applied when neither the call nor the builder names one.
pub const DEFAULT_EXPIRES_SECS: i64 = 30;

/// Prefix prepended to every derived storage key.
pub const DEFAULT_KEY_PREFIX: &str = "STRATA_STORAGE: ";

const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// A builder for `Storage` instances.
pub struct StorageBuilder {
  backend: Option<Backend>,
  white_list: Vec<String>,
  refill_map: HashMap<String, RefillFn>,
  default_expires: Expires,
  key_prefix: String,
  sweep_interval: Duration,
  auto_sweep: bool,
  clock: Arc<dyn Clock>,
  diag: Arc<dyn Diagnostics>,
}

impl fmt::Debug for StorageBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StorageBuilder")
      .field("backend", &self.backend)
      .field("white_list", &self.white_list)
      .field("default_expires", &self.default_expires)
      .field("key_prefix", &self.key_prefix)
      .field("sweep_interval", &self.sweep_interval)
      .field("auto_sweep", &self.auto_sweep)
      .finish_non_exhaustive()
  }
}

impl StorageBuilder {
  pub fn new() -> Self {
    Self {
      backend: None,
      white_list: Vec::new(),
      refill_map: HashMap::new(),
      default_expires: Expires::After(DEFAULT_EXPIRES_SECS),
      key_prefix: DEFAULT_KEY_PREFIX.to_string(),
      sweep_interval: DEFAULT_SWEEP_INTERVAL,
      auto_sweep: true,
      clock: Arc::new(SystemClock),
      diag: Arc::new(TracingDiagnostics),
    }
  }

  /// Sets the backend to adapt. Without one, data lives in memory only and
  /// a warning is emitted at build time.
  pub fn backend(mut self, backend: Backend) -> Self {
    self.backend = Some(backend);
    self
  }

  /// Instance-level whitelist, merged into every clear.
  pub fn white_list<I, S>(mut self, entries: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.white_list = entries.into_iter().map(Into::into).collect();
    self
  }

  /// Registers the default refill function for a key prefix, used when a
  /// load names no refill of its own.
  pub fn refill<F, Fut>(mut self, prefix: impl Into<String>, refill: F) -> Self
  where
    F: Fn(RefillArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, StorageError>> + Send + 'static,
  {
    self
      .refill_map
      .insert(prefix.into(), Arc::new(move |args| Box::pin(refill(args))));
    self
  }

  /// TTL applied when a save or auto-save names none. Defaults to 30 s.
  pub fn default_expires(mut self, expires: Expires) -> Self {
    self.default_expires = expires;
    self
  }

  /// String prepended to every derived key, namespacing this instance's
  /// entries in a shared backing store.
  pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.key_prefix = prefix.into();
    self
  }

  /// How often the background sweep runs. Defaults to 60 s.
  pub fn sweep_interval(mut self, every: Duration) -> Self {
    self.sweep_interval = every;
    self
  }

  /// Disables the background sweeper entirely when false.
  pub fn auto_sweep(mut self, enabled: bool) -> Self {
    self.auto_sweep = enabled;
    self
  }

  /// Overrides the wall clock used for expiration checks.
  pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  /// Overrides the diagnostics sink.
  pub fn diagnostics(mut self, diag: impl Diagnostics + 'static) -> Self {
    self.diag = Arc::new(diag);
    self
  }

  /// Builds the handle: binds the backend (or the memory-only fallback) and
  /// starts the background sweeper.
  pub fn build(self) -> Storage {
    let adapter = adapter::bind(self.backend, &self.diag);
    let shared = Arc::new(StorageShared {
      memory: MemoryCache::default(),
      adapter,
      refills: RefillCoordinator::default(),
      refill_map: self.refill_map,
      white_list: WhiteList::new(self.white_list),
      default_expires: self.default_expires,
      key_prefix: self.key_prefix,
      clock: self.clock,
      diag: self.diag,
    });

    let sweeper = if self.auto_sweep {
      Sweeper::spawn(Arc::clone(&shared), self.sweep_interval)
    } else {
      None
    };

    Storage { shared, sweeper }
  }
}

impl Default for StorageBuilder {
  fn default() -> Self {
    Self::new()
  }
}
