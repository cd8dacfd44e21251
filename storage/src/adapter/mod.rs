//! Backend adapters.
//!
//! Three recognized backend shapes sit behind one capability-normalized
//! contract the engine drives. Classification happens at the type level: the
//! adapter author states which contract a backend satisfies by wrapping it in
//! the matching [`Backend`] variant, instead of the engine probing for method
//! presence at runtime.

mod callback;
mod key_indexed;
mod memory;
mod promise;

use std::fmt;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture};

use crate::diag::Diagnostics;
use crate::error::StorageError;
use crate::record::Record;
use crate::whitelist::WhiteList;

pub use callback::CallbackStore;
pub use key_indexed::KeyIndexedStore;
pub use promise::AsyncStore;

pub(crate) use callback::CallbackAdapter;
pub(crate) use key_indexed::KeyIndexedAdapter;
pub(crate) use memory::MemoryOnlyAdapter;
pub(crate) use promise::AsyncStoreAdapter;

/// Completion callback handed to the callback-style backend operations.
pub type Done<T> = Box<dyn FnOnce(Result<T, StorageError>) + Send>;

/// Summary information about a backend's contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageInfo {
  pub keys: Vec<String>,
}

/// The recognized backend shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
  /// Synchronous, index-enumerable item store (browser `localStorage` style).
  KeyIndexed,
  /// Future-returning item store (mobile `AsyncStorage` style).
  Async,
  /// Callback-style store with a synchronous twin API (mini-app style).
  Callback,
  /// The in-memory fallback bound when no backend is supplied.
  Memory,
}

/// A storage backend, tagged by shape.
#[derive(Clone)]
pub enum Backend {
  KeyIndexed(Arc<dyn KeyIndexedStore>),
  Async(Arc<dyn AsyncStore>),
  Callback(Arc<dyn CallbackStore>),
}

impl Backend {
  pub fn kind(&self) -> BackendKind {
    match self {
      Backend::KeyIndexed(_) => BackendKind::KeyIndexed,
      Backend::Async(_) => BackendKind::Async,
      Backend::Callback(_) => BackendKind::Callback,
    }
  }
}

impl fmt::Debug for Backend {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Backend").field(&self.kind()).finish()
  }
}

/// The capability-normalized contract the engine drives.
///
/// Every asynchronous operation returns a future. The synchronous mirror
/// defaults to `SyncUnsupported`, so only adapters with a native synchronous
/// capability opt in.
pub trait StorageAdapter: Send + Sync {
  fn kind(&self) -> BackendKind;

  /// Reads the record stored under `key`. `Ok(None)` is "not found".
  /// Adapters that cannot distinguish absence from failure report an error,
  /// which the load path treats the same way.
  fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Record>, StorageError>>;

  fn set<'a>(&'a self, key: &'a str, record: Record) -> BoxFuture<'a, Result<(), StorageError>>;

  fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;

  fn list_keys(&self) -> BoxFuture<'_, Result<Vec<String>, StorageError>>;

  /// Removes every non-whitelisted key. The default walks `list_keys` and
  /// issues the removes concurrently; adapters with a native bulk remove
  /// override this.
  fn clear(&self, white_list: WhiteList) -> BoxFuture<'_, Result<(), StorageError>> {
    Box::pin(async move {
      let keys = self.list_keys().await?;
      let doomed = white_list.filter_unprotected(keys);
      let results = future::join_all(doomed.iter().map(|key| self.remove(key))).await;
      results.into_iter().collect()
    })
  }

  fn get_sync(&self, _key: &str) -> Result<Option<Record>, StorageError> {
    Err(StorageError::SyncUnsupported)
  }

  fn set_sync(&self, _key: &str, _record: Record) -> Result<(), StorageError> {
    Err(StorageError::SyncUnsupported)
  }

  fn remove_sync(&self, _key: &str) -> Result<(), StorageError> {
    Err(StorageError::SyncUnsupported)
  }

  fn list_keys_sync(&self) -> Result<Vec<String>, StorageError> {
    Err(StorageError::SyncUnsupported)
  }

  fn clear_sync(&self, white_list: WhiteList) -> Result<(), StorageError> {
    let keys = self.list_keys_sync()?;
    for key in white_list.filter_unprotected(keys) {
      self.remove_sync(&key)?;
    }
    Ok(())
  }
}

/// Binds the supplied backend, or the memory-only fallback when none is
/// given.
pub(crate) fn bind(backend: Option<Backend>, diag: &Arc<dyn Diagnostics>) -> Arc<dyn StorageAdapter> {
  match backend {
    Some(Backend::KeyIndexed(store)) => Arc::new(KeyIndexedAdapter::new(store)),
    Some(Backend::Async(store)) => Arc::new(AsyncStoreAdapter::new(store)),
    Some(Backend::Callback(store)) => Arc::new(CallbackAdapter::new(store)),
    None => {
      diag.warn("no storage backend supplied; data lives in memory only and is lost on restart");
      Arc::new(MemoryOnlyAdapter)
    }
  }
}
