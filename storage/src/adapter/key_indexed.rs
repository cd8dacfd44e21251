use std::sync::Arc;

use futures_util::future::{self, BoxFuture};

use crate::adapter::{BackendKind, StorageAdapter};
use crate::error::StorageError;
use crate::record::Record;

/// Shape of a synchronous, index-enumerable item store (browser
/// `localStorage` style). Values are opaque strings.
pub trait KeyIndexedStore: Send + Sync {
  fn get_item(&self, key: &str) -> Option<String>;

  /// Writes may fail (quota limits); reads and removes do not.
  fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

  fn remove_item(&self, key: &str);

  /// Number of stored items.
  fn length(&self) -> usize;

  /// The key stored at `index`, for enumeration; `None` past the end.
  fn key_at(&self, index: usize) -> Option<String>;
}

/// Adapter over a `KeyIndexedStore`: serializes records to JSON strings and
/// lifts the synchronous calls into ready futures. The full synchronous
/// mirror is supported.
pub(crate) struct KeyIndexedAdapter {
  store: Arc<dyn KeyIndexedStore>,
}

impl KeyIndexedAdapter {
  pub(crate) fn new(store: Arc<dyn KeyIndexedStore>) -> Self {
    Self { store }
  }

  fn keys(&self) -> Vec<String> {
    (0..self.store.length())
      .filter_map(|index| self.store.key_at(index))
      .collect()
  }
}

impl StorageAdapter for KeyIndexedAdapter {
  fn kind(&self) -> BackendKind {
    BackendKind::KeyIndexed
  }

  fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Record>, StorageError>> {
    Box::pin(future::ready(self.get_sync(key)))
  }

  fn set<'a>(&'a self, key: &'a str, record: Record) -> BoxFuture<'a, Result<(), StorageError>> {
    Box::pin(future::ready(self.set_sync(key, record)))
  }

  fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
    Box::pin(future::ready(self.remove_sync(key)))
  }

  fn list_keys(&self) -> BoxFuture<'_, Result<Vec<String>, StorageError>> {
    Box::pin(future::ready(Ok(self.keys())))
  }

  fn get_sync(&self, key: &str) -> Result<Option<Record>, StorageError> {
    match self.store.get_item(key) {
      None => Ok(None),
      Some(text) => serde_json::from_str(&text)
        .map(Some)
        .map_err(|err| StorageError::Backend(format!("stored value is not a record: {}", err))),
    }
  }

  fn set_sync(&self, key: &str, record: Record) -> Result<(), StorageError> {
    let text = serde_json::to_string(&record).map_err(|err| StorageError::Backend(err.to_string()))?;
    self.store.set_item(key, &text)
  }

  fn remove_sync(&self, key: &str) -> Result<(), StorageError> {
    self.store.remove_item(key);
    Ok(())
  }

  fn list_keys_sync(&self) -> Result<Vec<String>, StorageError> {
    Ok(self.keys())
  }
}
