use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::adapter::{BackendKind, StorageAdapter};
use crate::error::StorageError;
use crate::record::Record;
use crate::whitelist::WhiteList;

/// Shape of a future-returning item store (mobile `AsyncStorage` style).
/// Values are opaque strings; no synchronous twin exists.
pub trait AsyncStore: Send + Sync {
  fn get_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StorageError>>;

  fn set_item<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StorageError>>;

  fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;

  fn get_all_keys(&self) -> BoxFuture<'_, Result<Vec<String>, StorageError>>;

  /// Removes several keys in one backend round trip.
  fn multi_remove<'a>(&'a self, keys: Vec<String>) -> BoxFuture<'a, Result<(), StorageError>>;
}

/// Adapter over an `AsyncStore`. The synchronous mirror stays unsupported,
/// matching the backend's own API surface.
pub(crate) struct AsyncStoreAdapter {
  store: Arc<dyn AsyncStore>,
}

impl AsyncStoreAdapter {
  pub(crate) fn new(store: Arc<dyn AsyncStore>) -> Self {
    Self { store }
  }
}

impl StorageAdapter for AsyncStoreAdapter {
  fn kind(&self) -> BackendKind {
    BackendKind::Async
  }

  fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Record>, StorageError>> {
    Box::pin(async move {
      match self.store.get_item(key).await? {
        None => Ok(None),
        Some(text) => serde_json::from_str(&text)
          .map(Some)
          .map_err(|err| StorageError::Backend(format!("stored value is not a record: {}", err))),
      }
    })
  }

  fn set<'a>(&'a self, key: &'a str, record: Record) -> BoxFuture<'a, Result<(), StorageError>> {
    Box::pin(async move {
      let text = serde_json::to_string(&record).map_err(|err| StorageError::Backend(err.to_string()))?;
      self.store.set_item(key, text).await
    })
  }

  fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
    self.store.remove_item(key)
  }

  fn list_keys(&self) -> BoxFuture<'_, Result<Vec<String>, StorageError>> {
    self.store.get_all_keys()
  }

  /// Bulk removal goes through the backend's native `multi_remove`.
  fn clear(&self, white_list: WhiteList) -> BoxFuture<'_, Result<(), StorageError>> {
    Box::pin(async move {
      let keys = self.store.get_all_keys().await?;
      let doomed = white_list.filter_unprotected(keys);
      if doomed.is_empty() {
        return Ok(());
      }
      self.store.multi_remove(doomed).await
    })
  }
}
