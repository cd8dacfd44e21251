#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{self, BoxFuture};
use parking_lot::Mutex;
use serde_json::Value;

use strata_storage::{
  AsyncStore, CallbackStore, Clock, Diagnostics, Done, KeyIndexedStore, StorageError, StorageInfo,
};

/// A clock the test advances by hand.
#[derive(Clone, Default)]
pub struct ManualClock {
  secs: Arc<AtomicI64>,
}

impl ManualClock {
  pub fn new(start: i64) -> Self {
    Self {
      secs: Arc::new(AtomicI64::new(start)),
    }
  }

  pub fn advance(&self, secs: i64) {
    self.secs.fetch_add(secs, Ordering::SeqCst);
  }

  pub fn set(&self, secs: i64) {
    self.secs.store(secs, Ordering::SeqCst);
  }
}

impl Clock for ManualClock {
  fn epoch_secs(&self) -> i64 {
    self.secs.load(Ordering::SeqCst)
  }
}

/// Key-indexed (localStorage-shaped) store over an insertion-ordered list.
#[derive(Default)]
pub struct MemoryLocalStore {
  items: Mutex<Vec<(String, String)>>,
  pub set_calls: AtomicUsize,
}

impl MemoryLocalStore {
  /// The raw stored text, bypassing the adapter.
  pub fn raw(&self, key: &str) -> Option<String> {
    self.items.lock().iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
  }

  /// Plants a raw value, bypassing the adapter.
  pub fn put_raw(&self, key: &str, value: &str) {
    let mut items = self.items.lock();
    match items.iter_mut().find(|(k, _)| k == key) {
      Some(slot) => slot.1 = value.to_string(),
      None => items.push((key.to_string(), value.to_string())),
    }
  }

  /// Drops a stored value, bypassing the adapter.
  pub fn remove_raw(&self, key: &str) {
    self.items.lock().retain(|(k, _)| k != key);
  }

  pub fn item_count(&self) -> usize {
    self.items.lock().len()
  }
}

impl KeyIndexedStore for MemoryLocalStore {
  fn get_item(&self, key: &str) -> Option<String> {
    self.raw(key)
  }

  fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
    self.set_calls.fetch_add(1, Ordering::SeqCst);
    self.put_raw(key, value);
    Ok(())
  }

  fn remove_item(&self, key: &str) {
    self.items.lock().retain(|(k, _)| k != key);
  }

  fn length(&self) -> usize {
    self.item_count()
  }

  fn key_at(&self, index: usize) -> Option<String> {
    self.items.lock().get(index).map(|(k, _)| k.clone())
  }
}

/// A key-indexed store whose writes always fail.
#[derive(Default)]
pub struct FailingLocalStore;

impl KeyIndexedStore for FailingLocalStore {
  fn get_item(&self, _key: &str) -> Option<String> {
    None
  }

  fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
    Err(StorageError::Backend("quota exceeded".into()))
  }

  fn remove_item(&self, _key: &str) {}

  fn length(&self) -> usize {
    0
  }

  fn key_at(&self, _index: usize) -> Option<String> {
    None
  }
}

/// AsyncStorage-shaped store that records its bulk removals.
#[derive(Default)]
pub struct RecordingAsyncStore {
  items: Mutex<HashMap<String, String>>,
  pub multi_remove_calls: AtomicUsize,
}

impl RecordingAsyncStore {
  pub fn raw(&self, key: &str) -> Option<String> {
    self.items.lock().get(key).cloned()
  }

  pub fn keys(&self) -> Vec<String> {
    self.items.lock().keys().cloned().collect()
  }
}

impl AsyncStore for RecordingAsyncStore {
  fn get_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
    Box::pin(future::ready(Ok(self.items.lock().get(key).cloned())))
  }

  fn set_item<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StorageError>> {
    self.items.lock().insert(key.to_string(), value);
    Box::pin(future::ready(Ok(())))
  }

  fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
    self.items.lock().remove(key);
    Box::pin(future::ready(Ok(())))
  }

  fn get_all_keys(&self) -> BoxFuture<'_, Result<Vec<String>, StorageError>> {
    Box::pin(future::ready(Ok(self.keys())))
  }

  fn multi_remove<'a>(&'a self, keys: Vec<String>) -> BoxFuture<'a, Result<(), StorageError>> {
    self.multi_remove_calls.fetch_add(1, Ordering::SeqCst);
    let mut items = self.items.lock();
    for key in keys {
      items.remove(&key);
    }
    Box::pin(future::ready(Ok(())))
  }
}

/// Mini-app-shaped callback store with a synchronous twin API.
#[derive(Default)]
pub struct CallbackMemoryStore {
  items: Mutex<HashMap<String, Value>>,
}

impl CallbackMemoryStore {
  pub fn keys(&self) -> Vec<String> {
    self.items.lock().keys().cloned().collect()
  }
}

impl CallbackStore for CallbackMemoryStore {
  fn get_storage(&self, key: &str, done: Done<Value>) {
    done(self.get_storage_sync(key));
  }

  fn set_storage(&self, key: &str, data: Value, done: Done<()>) {
    done(self.set_storage_sync(key, data));
  }

  fn remove_storage(&self, key: &str, done: Done<()>) {
    done(self.remove_storage_sync(key));
  }

  fn get_storage_info(&self, done: Done<StorageInfo>) {
    done(self.get_storage_info_sync());
  }

  fn get_storage_sync(&self, key: &str) -> Result<Value, StorageError> {
    self
      .items
      .lock()
      .get(key)
      .cloned()
      .ok_or_else(|| StorageError::Backend(format!("no value for {}", key)))
  }

  fn set_storage_sync(&self, key: &str, data: Value) -> Result<(), StorageError> {
    self.items.lock().insert(key.to_string(), data);
    Ok(())
  }

  fn remove_storage_sync(&self, key: &str) -> Result<(), StorageError> {
    self.items.lock().remove(key);
    Ok(())
  }

  fn get_storage_info_sync(&self) -> Result<StorageInfo, StorageError> {
    Ok(StorageInfo { keys: self.keys() })
  }
}

/// Diagnostics sink that records everything it is told.
#[derive(Clone, Default)]
pub struct RecordingDiagnostics {
  pub warnings: Arc<Mutex<Vec<String>>>,
  pub errors: Arc<Mutex<Vec<String>>>,
}

impl Diagnostics for RecordingDiagnostics {
  fn info(&self, _message: &str) {}

  fn warn(&self, message: &str) {
    self.warnings.lock().push(message.to_string());
  }

  fn error(&self, message: &str) {
    self.errors.lock().push(message.to_string());
  }
}

/// The derived storage key for `key` under the default prefix.
pub fn store_key(key: &str) -> String {
  format!("{}{}", strata_storage::builder::DEFAULT_KEY_PREFIX, key)
}

/// Polls `check` until it holds or `timeout` elapses.
pub async fn wait_until(check: impl Fn() -> bool, timeout: Duration) -> bool {
  let tries = (timeout.as_millis() / 5).max(1);
  for _ in 0..tries {
    if check() {
      return true;
    }
    tokio::time::sleep(Duration::from_millis(5)).await;
  }
  check()
}
