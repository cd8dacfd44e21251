use std::sync::Arc;

use futures_util::future::{self, BoxFuture};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::adapter::{BackendKind, Done, StorageAdapter, StorageInfo};
use crate::error::StorageError;
use crate::record::Record;

/// Shape of a callback-style store with a synchronous twin API (mini-app
/// style). Values are native JSON documents rather than strings.
pub trait CallbackStore: Send + Sync {
  /// Reads `key`; stores of this shape fail the callback for a missing key.
  fn get_storage(&self, key: &str, done: Done<Value>);

  fn set_storage(&self, key: &str, data: Value, done: Done<()>);

  fn remove_storage(&self, key: &str, done: Done<()>);

  fn get_storage_info(&self, done: Done<StorageInfo>);

  fn get_storage_sync(&self, key: &str) -> Result<Value, StorageError>;

  fn set_storage_sync(&self, key: &str, data: Value) -> Result<(), StorageError>;

  fn remove_storage_sync(&self, key: &str) -> Result<(), StorageError>;

  fn get_storage_info_sync(&self) -> Result<StorageInfo, StorageError>;
}

/// Adapter over a `CallbackStore`: bridges each completion callback into a
/// oneshot future and keeps records as native JSON values.
pub(crate) struct CallbackAdapter {
  store: Arc<dyn CallbackStore>,
}

impl CallbackAdapter {
  pub(crate) fn new(store: Arc<dyn CallbackStore>) -> Self {
    Self { store }
  }
}

fn settle<T>(rx: oneshot::Receiver<Result<T, StorageError>>) -> BoxFuture<'static, Result<T, StorageError>>
where
  T: Send + 'static,
{
  Box::pin(async move {
    rx.await
      .unwrap_or_else(|_| Err(StorageError::Backend("backend dropped its completion callback".into())))
  })
}

fn record_from(value: Value) -> Result<Option<Record>, StorageError> {
  serde_json::from_value(value)
    .map(Some)
    .map_err(|err| StorageError::Backend(format!("stored value is not a record: {}", err)))
}

impl StorageAdapter for CallbackAdapter {
  fn kind(&self) -> BackendKind {
    BackendKind::Callback
  }

  fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Record>, StorageError>> {
    let (tx, rx) = oneshot::channel();
    self.store.get_storage(
      key,
      Box::new(move |result| {
        let _ = tx.send(result);
      }),
    );
    Box::pin(async move { record_from(settle(rx).await?) })
  }

  fn set<'a>(&'a self, key: &'a str, record: Record) -> BoxFuture<'a, Result<(), StorageError>> {
    let data = match serde_json::to_value(&record) {
      Ok(data) => data,
      Err(err) => return Box::pin(future::ready(Err(StorageError::Backend(err.to_string())))),
    };
    let (tx, rx) = oneshot::channel();
    self.store.set_storage(
      key,
      data,
      Box::new(move |result| {
        let _ = tx.send(result);
      }),
    );
    settle(rx)
  }

  fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
    let (tx, rx) = oneshot::channel();
    self.store.remove_storage(
      key,
      Box::new(move |result| {
        let _ = tx.send(result);
      }),
    );
    settle(rx)
  }

  fn list_keys(&self) -> BoxFuture<'_, Result<Vec<String>, StorageError>> {
    let (tx, rx) = oneshot::channel();
    self.store.get_storage_info(Box::new(move |result| {
      let _ = tx.send(result);
    }));
    Box::pin(async move { Ok(settle(rx).await?.keys) })
  }

  fn get_sync(&self, key: &str) -> Result<Option<Record>, StorageError> {
    record_from(self.store.get_storage_sync(key)?)
  }

  fn set_sync(&self, key: &str, record: Record) -> Result<(), StorageError> {
    let data = serde_json::to_value(&record).map_err(|err| StorageError::Backend(err.to_string()))?;
    self.store.set_storage_sync(key, data)
  }

  fn remove_sync(&self, key: &str) -> Result<(), StorageError> {
    self.store.remove_storage_sync(key)
  }

  fn list_keys_sync(&self) -> Result<Vec<String>, StorageError> {
    Ok(self.store.get_storage_info_sync()?.keys)
  }
}
