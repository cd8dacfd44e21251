use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::adapter::StorageAdapter;
use crate::clock::Clock;
use crate::diag::Diagnostics;
use crate::error::StorageError;
use crate::key;
use crate::memory::MemoryCache;
use crate::params::{LoadItem, RefillArgs, RefillFn, RemoveItem, SaveItem, SyncParams};
use crate::record::{plan_expiry, Envelope, Expires, ExpiryPlan, Record};
use crate::refill::RefillCoordinator;
use crate::whitelist::WhiteList;

/// The shared core owned by a `Storage` handle and its background tasks.
///
/// The memory cache and the in-flight refill registry belong exclusively to
/// one instance; the adapter is an injected collaborator.
pub(crate) struct StorageShared {
  pub(crate) memory: MemoryCache,
  pub(crate) adapter: Arc<dyn StorageAdapter>,
  pub(crate) refills: RefillCoordinator,
  pub(crate) refill_map: HashMap<String, RefillFn>,
  pub(crate) white_list: WhiteList,
  pub(crate) default_expires: Expires,
  pub(crate) key_prefix: String,
  pub(crate) clock: Arc<dyn Clock>,
  pub(crate) diag: Arc<dyn Diagnostics>,
}

impl StorageShared {
  pub(crate) fn now(&self) -> i64 {
    self.clock.epoch_secs()
  }

  pub(crate) fn resolve_key(
    &self,
    key: &str,
    full_key: &str,
    params: &SyncParams,
  ) -> Result<String, StorageError> {
    key::resolve_full_key(&self.key_prefix, key, full_key, params)
  }

  pub(crate) fn resolve_remove_key(&self, item: &RemoveItem) -> Result<String, StorageError> {
    if !item.full_key.is_empty() {
      return Ok(item.full_key.clone());
    }
    if item.key.is_empty() {
      return Err(StorageError::MissingKey);
    }
    Ok(format!("{}{}", self.key_prefix, item.key))
  }

  /// The save path: validate, plan expiry, mirror to memory, write through.
  pub(crate) async fn save_one(&self, item: SaveItem) -> Result<(), StorageError> {
    let key = self.resolve_key(&item.key, &item.full_key, &item.sync_params)?;
    let ttl = item.expires.unwrap_or(self.default_expires);
    match plan_expiry(ttl, self.now()) {
      ExpiryPlan::Skip => Ok(()),
      ExpiryPlan::Store(expires) => {
        let record = Record {
          raw_data: item.data,
          expires,
        };
        if item.enable_cache {
          self.memory.set(&key, record.clone());
        }
        self.adapter.set(&key, record).await
      }
    }
  }

  pub(crate) fn save_one_sync(&self, item: SaveItem) -> Result<(), StorageError> {
    let key = self.resolve_key(&item.key, &item.full_key, &item.sync_params)?;
    let ttl = item.expires.unwrap_or(self.default_expires);
    match plan_expiry(ttl, self.now()) {
      ExpiryPlan::Skip => Ok(()),
      ExpiryPlan::Store(expires) => {
        let record = Record {
          raw_data: item.data,
          expires,
        };
        if item.enable_cache {
          self.memory.set(&key, record.clone());
        }
        match self.adapter.set_sync(&key, record) {
          Ok(()) => Ok(()),
          Err(err) => {
            // A failed write must not leave a mirror entry that the backend
            // never accepted.
            self.memory.delete(&key);
            Err(err)
          }
        }
      }
    }
  }

  /// The load path: memory first, then the backend, then the refill.
  pub(crate) async fn load_one(self: Arc<Self>, item: LoadItem) -> Result<Value, StorageError> {
    let key = self.resolve_key(&item.key, &item.full_key, &item.sync_params)?;
    let refill = item
      .refill
      .clone()
      .or_else(|| self.refill_map.get(&item.key).cloned());

    if !item.force_update {
      if item.enable_cache {
        if let Some(record) = self.memory.get(&key) {
          if !record.is_expired(self.now()) {
            return Ok(record.raw_data);
          }
        }
      }

      // A backend read failure deliberately degrades to a miss so the
      // refill path still gets its chance.
      if let Ok(Some(record)) = self.adapter.get(&key).await {
        if !record.is_expired(self.now()) {
          if item.enable_cache {
            self.memory.set(&key, record.clone());
          }
          return Ok(record.raw_data);
        }
      }
    }

    let Some(refill) = refill else {
      return Err(StorageError::NotFound { key });
    };

    let task = self.refills.join_or_start(
      &key,
      || Self::refill_future(&self, key.clone(), refill, &item),
      |task| {
        // Detached driver: the refill settles even if every caller loses
        // interest, and late same-key joiners still receive its outcome.
        tokio::spawn(async move {
          let _ = task.await;
        });
      },
    );

    task.await.map(Envelope::into_value)
  }

  /// Synchronous load. Never invokes a refill: the outcome is the fresh
  /// cached/stored value, or nothing.
  pub(crate) fn load_one_sync(&self, item: LoadItem) -> Result<Option<Value>, StorageError> {
    let key = self.resolve_key(&item.key, &item.full_key, &item.sync_params)?;

    let record = if item.enable_cache { self.memory.get(&key) } else { None };
    let record = match record {
      Some(record) => Some(record),
      None => match self.adapter.get_sync(&key) {
        Ok(record) => record,
        Err(StorageError::SyncUnsupported) => return Err(StorageError::SyncUnsupported),
        Err(_) => None,
      },
    };

    let now = self.now();
    Ok(
      record
        .filter(|record| !record.is_expired(now))
        .map(|record| record.raw_data),
    )
  }

  /// Builds the single in-flight refill future for `key`: run the refill,
  /// deregister the key, then normalize and (optionally) persist the
  /// outcome.
  fn refill_future(
    shared: &Arc<Self>,
    key: String,
    refill: RefillFn,
    item: &LoadItem,
  ) -> BoxFuture<'static, Result<Envelope, StorageError>> {
    let shared = Arc::clone(shared);
    let args = RefillArgs {
      params: item.sync_params.clone(),
      options: item.sync_options.clone(),
    };
    let auto_save = item.auto_save;
    let expires = item.expires;

    Box::pin(async move {
      let outcome = refill(args).await;

      // Deregister before any waiter observes the outcome: a call arriving
      // right after settlement must start fresh work.
      shared.refills.finish(&key);

      let value = match outcome {
        Ok(value) => value,
        Err(err) => {
          shared.diag.error(&format!("refill for {:?} failed: {}", key, err));
          return Err(err);
        }
      };

      let envelope = Envelope::normalize(value);
      if envelope.code == 0 && auto_save {
        let persist = {
          let shared = Arc::clone(&shared);
          let key = key.clone();
          let data = envelope.clone().into_value();
          async move {
            let mut saved = SaveItem::new("", data).full_key(key.clone());
            if let Some(expires) = expires {
              saved = saved.expires(expires);
            }
            if let Err(err) = shared.save_one(saved).await {
              shared.diag.warn(&format!("auto-save for {:?} failed: {}", key, err));
            }
          }
        };
        // The caller already holds valid data; persisting happens in the
        // background and its failure never fails the load.
        tokio::spawn(persist);
      }

      Ok(envelope)
    })
  }
}
