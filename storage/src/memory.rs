use std::collections::HashMap;

use ahash::RandomState;
use parking_lot::Mutex;

use crate::record::Record;
use crate::whitelist::WhiteList;

/// In-memory mirror of a subset of the persisted records.
///
/// Rebuilt empty on every process start. Consulted before the backend on
/// every load, which is the zero-I/O fast path the facade exists for.
#[derive(Debug, Default)]
pub(crate) struct MemoryCache {
  map: Mutex<HashMap<String, Record, RandomState>>,
}

impl MemoryCache {
  pub(crate) fn get(&self, key: &str) -> Option<Record> {
    self.map.lock().get(key).cloned()
  }

  pub(crate) fn set(&self, key: &str, record: Record) {
    self.map.lock().insert(key.to_string(), record);
  }

  pub(crate) fn delete(&self, key: &str) {
    self.map.lock().remove(key);
  }

  /// Removes every record matching `predicate`.
  pub(crate) fn delete_if(&self, mut predicate: impl FnMut(&str, &Record) -> bool) {
    self.map.lock().retain(|key, record| !predicate(key, record));
  }

  pub(crate) fn keys(&self) -> Vec<String> {
    self.map.lock().keys().cloned().collect()
  }

  /// Drops every record whose key the whitelist does not protect.
  pub(crate) fn clear_unprotected(&self, white_list: &WhiteList) {
    self.map.lock().retain(|key, _| white_list.is_protected(key));
  }
}
