use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::{Map, Value};

use crate::error::StorageError;
use crate::record::Expires;

/// Structured parameters appended to a derived key and handed to refill
/// functions. Iteration order is insertion order, which keeps derived keys
/// deterministic for a given construction sequence.
pub type SyncParams = Map<String, Value>;

/// The future a refill function produces.
pub type RefillFuture = BoxFuture<'static, Result<Value, StorageError>>;

/// A caller-supplied operation that produces fresh data for a key when no
/// valid cached or stored copy exists.
pub type RefillFn = Arc<dyn Fn(RefillArgs) -> RefillFuture + Send + Sync>;

/// Arguments handed to a refill function.
#[derive(Debug, Clone, Default)]
pub struct RefillArgs {
  /// The sync params the storage key was derived from.
  pub params: SyncParams,
  /// Extra caller-supplied arguments, forwarded untouched.
  pub options: Vec<Value>,
}

/// Parameters for a single save.
#[derive(Debug, Clone)]
pub struct SaveItem {
  pub(crate) key: String,
  pub(crate) full_key: String,
  pub(crate) data: Value,
  pub(crate) expires: Option<Expires>,
  pub(crate) sync_params: SyncParams,
  pub(crate) enable_cache: bool,
}

impl SaveItem {
  pub fn new(key: impl Into<String>, data: impl Into<Value>) -> Self {
    Self {
      key: key.into(),
      full_key: String::new(),
      data: data.into(),
      expires: None,
      sync_params: SyncParams::new(),
      enable_cache: true,
    }
  }

  /// Bypasses key derivation entirely with an explicit storage key.
  pub fn full_key(mut self, full_key: impl Into<String>) -> Self {
    self.full_key = full_key.into();
    self
  }

  /// TTL for this item. The instance default applies when unset.
  pub fn expires(mut self, expires: Expires) -> Self {
    self.expires = Some(expires);
    self
  }

  /// Params appended to the derived key.
  pub fn sync_params(mut self, params: SyncParams) -> Self {
    self.sync_params = params;
    self
  }

  /// Whether the memory cache mirrors this write. Defaults to true.
  pub fn enable_cache(mut self, enable: bool) -> Self {
    self.enable_cache = enable;
    self
  }
}

/// Parameters for a single load.
#[derive(Clone)]
pub struct LoadItem {
  pub(crate) key: String,
  pub(crate) full_key: String,
  pub(crate) refill: Option<RefillFn>,
  pub(crate) sync_params: SyncParams,
  pub(crate) sync_options: Vec<Value>,
  pub(crate) expires: Option<Expires>,
  pub(crate) auto_save: bool,
  pub(crate) enable_cache: bool,
  pub(crate) force_update: bool,
}

impl LoadItem {
  pub fn new(key: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      full_key: String::new(),
      refill: None,
      sync_params: SyncParams::new(),
      sync_options: Vec::new(),
      expires: None,
      auto_save: true,
      enable_cache: true,
      force_update: false,
    }
  }

  /// Bypasses key derivation entirely with an explicit storage key.
  pub fn full_key(mut self, full_key: impl Into<String>) -> Self {
    self.full_key = full_key.into();
    self
  }

  /// The refill function run on a cache miss or expiry. When unset, the
  /// instance-level registry for this item's key prefix applies.
  pub fn refill<F, Fut>(mut self, refill: F) -> Self
  where
    F: Fn(RefillArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, StorageError>> + Send + 'static,
  {
    self.refill = Some(Arc::new(move |args| Box::pin(refill(args))));
    self
  }

  /// Params appended to the derived key and forwarded to the refill.
  pub fn sync_params(mut self, params: SyncParams) -> Self {
    self.sync_params = params;
    self
  }

  /// Extra arguments forwarded to the refill, untouched.
  pub fn sync_options(mut self, options: Vec<Value>) -> Self {
    self.sync_options = options;
    self
  }

  /// TTL used when a refill outcome is auto-saved. The instance default
  /// applies when unset.
  pub fn expires(mut self, expires: Expires) -> Self {
    self.expires = Some(expires);
    self
  }

  /// Whether a successful refill outcome is persisted. Defaults to true.
  pub fn auto_save(mut self, enable: bool) -> Self {
    self.auto_save = enable;
    self
  }

  /// Whether the memory cache participates in this load. Defaults to true.
  pub fn enable_cache(mut self, enable: bool) -> Self {
    self.enable_cache = enable;
    self
  }

  /// Skips both lookups and goes straight to the refill function.
  pub fn force_update(mut self, force: bool) -> Self {
    self.force_update = force;
    self
  }
}

impl fmt::Debug for LoadItem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LoadItem")
      .field("key", &self.key)
      .field("full_key", &self.full_key)
      .field("has_refill", &self.refill.is_some())
      .field("auto_save", &self.auto_save)
      .field("enable_cache", &self.enable_cache)
      .field("force_update", &self.force_update)
      .finish_non_exhaustive()
  }
}

/// Target of a remove: a key prefix or an explicit full key.
#[derive(Debug, Clone, Default)]
pub struct RemoveItem {
  pub(crate) key: String,
  pub(crate) full_key: String,
}

impl RemoveItem {
  pub fn key(key: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      full_key: String::new(),
    }
  }

  /// An explicit storage key; takes precedence over the derived one.
  pub fn full_key(full_key: impl Into<String>) -> Self {
    Self {
      key: String::new(),
      full_key: full_key.into(),
    }
  }
}

impl From<&str> for RemoveItem {
  fn from(key: &str) -> Self {
    Self::key(key)
  }
}

impl From<String> for RemoveItem {
  fn from(key: String) -> Self {
    Self::key(key)
  }
}
