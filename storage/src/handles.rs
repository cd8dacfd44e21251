use std::fmt;
use std::sync::Arc;

use futures_util::future;
use serde_json::Value;

use crate::adapter::{BackendKind, StorageInfo};
use crate::error::StorageError;
use crate::params::{LoadItem, RemoveItem, SaveItem};
use crate::shared::StorageShared;
use crate::task::sweeper::Sweeper;

/// The unified storage handle.
///
/// One `Storage` exclusively owns its memory cache, its in-flight refill
/// registry and its background sweeper; nothing is shared between instances.
/// Dropping the handle stops the sweeper.
pub struct Storage {
  pub(crate) shared: Arc<StorageShared>,
  pub(crate) sweeper: Option<Sweeper>,
}

impl fmt::Debug for Storage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Storage")
      .field("backend", &self.shared.adapter.kind())
      .field("key_prefix", &self.shared.key_prefix)
      .field("sweeper", &self.sweeper.is_some())
      .finish_non_exhaustive()
  }
}

impl Storage {
  /// The backend shape this instance is bound to.
  pub fn backend_kind(&self) -> BackendKind {
    self.shared.adapter.kind()
  }

  /// Persists one item. A non-positive TTL succeeds without writing.
  pub async fn save(&self, item: SaveItem) -> Result<(), StorageError> {
    self.shared.save_one(item).await
  }

  /// Persists several items concurrently. Every item settles before the
  /// first failure (in input order) is reported.
  pub async fn save_many(&self, items: Vec<SaveItem>) -> Result<(), StorageError> {
    let results = future::join_all(items.into_iter().map(|item| self.shared.save_one(item))).await;
    results.into_iter().collect()
  }

  /// Loads one item: memory cache first, then the backend, then the refill
  /// path. A fresh memory hit performs no I/O at all.
  pub async fn load(&self, item: LoadItem) -> Result<Value, StorageError> {
    Arc::clone(&self.shared).load_one(item).await
  }

  /// Loads several items concurrently; the result order matches the input
  /// order. Every item settles before the first failure is reported.
  pub async fn load_many(&self, items: Vec<LoadItem>) -> Result<Vec<Value>, StorageError> {
    let results = future::join_all(
      items
        .into_iter()
        .map(|item| Arc::clone(&self.shared).load_one(item)),
    )
    .await;
    results.into_iter().collect()
  }

  /// Removes a key from the memory cache and the backend. Removing an
  /// absent key succeeds.
  pub async fn remove(&self, item: impl Into<RemoveItem>) -> Result<(), StorageError> {
    self.remove_one(item.into()).await
  }

  /// Removes several keys concurrently.
  pub async fn remove_many<I>(&self, items: I) -> Result<(), StorageError>
  where
    I: IntoIterator<Item = RemoveItem>,
  {
    let results =
      future::join_all(items.into_iter().map(|item| self.remove_one(item))).await;
    results.into_iter().collect()
  }

  async fn remove_one(&self, item: RemoveItem) -> Result<(), StorageError> {
    let key = self.shared.resolve_remove_key(&item)?;
    self.shared.memory.delete(&key);
    self.shared.adapter.remove(&key).await
  }

  /// Clears every non-whitelisted entry from the memory cache and the
  /// backend. `white_list` is merged with the instance-level list.
  pub async fn clear(&self, white_list: &[String]) -> Result<(), StorageError> {
    let merged = self.shared.white_list.merged_with(white_list);
    self.shared.memory.clear_unprotected(&merged);
    self.shared.adapter.clear(merged).await
  }

  /// Keys currently known to the backend, or to the memory cache when this
  /// instance runs on the fallback adapter.
  pub async fn get_info(&self) -> Result<StorageInfo, StorageError> {
    if self.shared.adapter.kind() == BackendKind::Memory {
      return Ok(StorageInfo {
        keys: self.shared.memory.keys(),
      });
    }
    let keys = self.shared.adapter.list_keys().await?;
    Ok(StorageInfo { keys })
  }

  /// Synchronous save. Requires the backend's synchronous capability; a
  /// failed write rolls the memory mirror back before the error surfaces.
  pub fn save_sync(&self, item: SaveItem) -> Result<(), StorageError> {
    self.shared.save_one_sync(item)
  }

  pub fn save_many_sync(&self, items: Vec<SaveItem>) -> Result<(), StorageError> {
    items.into_iter().try_for_each(|item| self.shared.save_one_sync(item))
  }

  /// Synchronous load. Never invokes a refill function: the outcome is the
  /// fresh cached/stored value, or `None`.
  pub fn load_sync(&self, item: LoadItem) -> Result<Option<Value>, StorageError> {
    self.shared.load_one_sync(item)
  }

  pub fn load_many_sync(&self, items: Vec<LoadItem>) -> Result<Vec<Option<Value>>, StorageError> {
    items.into_iter().map(|item| self.shared.load_one_sync(item)).collect()
  }

  pub fn remove_sync(&self, item: impl Into<RemoveItem>) -> Result<(), StorageError> {
    let key = self.shared.resolve_remove_key(&item.into())?;
    self.shared.memory.delete(&key);
    self.shared.adapter.remove_sync(&key)
  }

  pub fn remove_many_sync<I>(&self, items: I) -> Result<(), StorageError>
  where
    I: IntoIterator<Item = RemoveItem>,
  {
    items.into_iter().try_for_each(|item| self.remove_sync(item))
  }

  pub fn clear_sync(&self, white_list: &[String]) -> Result<(), StorageError> {
    let merged = self.shared.white_list.merged_with(white_list);
    self.shared.memory.clear_unprotected(&merged);
    self.shared.adapter.clear_sync(merged)
  }

  pub fn get_info_sync(&self) -> Result<StorageInfo, StorageError> {
    if self.shared.adapter.kind() == BackendKind::Memory {
      return Ok(StorageInfo {
        keys: self.shared.memory.keys(),
      });
    }
    let keys = self.shared.adapter.list_keys_sync()?;
    Ok(StorageInfo { keys })
  }
}

impl Drop for Storage {
  fn drop(&mut self) {
    if let Some(sweeper) = self.sweeper.take() {
      sweeper.stop();
    }
  }
}
