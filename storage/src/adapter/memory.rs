use futures_util::future::{self, BoxFuture};

use crate::adapter::{BackendKind, StorageAdapter};
use crate::error::StorageError;
use crate::record::Record;
use crate::whitelist::WhiteList;

/// Fallback adapter bound when no backend is supplied.
///
/// Every operation succeeds trivially; nothing is persisted, so the memory
/// cache is the only place data lives.
pub(crate) struct MemoryOnlyAdapter;

impl StorageAdapter for MemoryOnlyAdapter {
  fn kind(&self) -> BackendKind {
    BackendKind::Memory
  }

  fn get<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Result<Option<Record>, StorageError>> {
    Box::pin(future::ready(Ok(None)))
  }

  fn set<'a>(&'a self, _key: &'a str, _record: Record) -> BoxFuture<'a, Result<(), StorageError>> {
    Box::pin(future::ready(Ok(())))
  }

  fn remove<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
    Box::pin(future::ready(Ok(())))
  }

  fn list_keys(&self) -> BoxFuture<'_, Result<Vec<String>, StorageError>> {
    Box::pin(future::ready(Ok(Vec::new())))
  }

  fn clear(&self, _white_list: WhiteList) -> BoxFuture<'_, Result<(), StorageError>> {
    Box::pin(future::ready(Ok(())))
  }

  fn get_sync(&self, _key: &str) -> Result<Option<Record>, StorageError> {
    Ok(None)
  }

  fn set_sync(&self, _key: &str, _record: Record) -> Result<(), StorageError> {
    Ok(())
  }

  fn remove_sync(&self, _key: &str) -> Result<(), StorageError> {
    Ok(())
  }

  fn list_keys_sync(&self) -> Result<Vec<String>, StorageError> {
    Ok(Vec::new())
  }

  fn clear_sync(&self, _white_list: WhiteList) -> Result<(), StorageError> {
    Ok(())
  }
}
