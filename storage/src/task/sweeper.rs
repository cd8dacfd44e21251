use std::sync::Arc;
use std::time::Duration;

use futures_util::future;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::shared::StorageShared;

/// The background task that periodically evicts expired records from the
/// memory cache and the backend.
pub(crate) struct Sweeper {
  handle: JoinHandle<()>,
}

impl Sweeper {
  /// Spawns the sweep loop: one immediate sweep, then one per `every`.
  /// Returns `None` (with a warning) when no runtime is available to host
  /// the task.
  pub(crate) fn spawn(shared: Arc<StorageShared>, every: Duration) -> Option<Self> {
    let runtime = match Handle::try_current() {
      Ok(handle) => handle,
      Err(_) => {
        shared
          .diag
          .warn("no async runtime available; expired entries will not be swept");
        return None;
      }
    };

    let every = every.max(Duration::from_millis(1));
    let handle = runtime.spawn(async move {
      let mut tick = tokio::time::interval(every);
      loop {
        tick.tick().await;
        sweep(&shared).await;
      }
    });

    Some(Self { handle })
  }

  pub(crate) fn stop(self) {
    self.handle.abort();
  }
}

/// One sweep pass. Per-key failures are swallowed: a bad key must neither
/// abort the pass nor stop future sweeps.
pub(crate) async fn sweep(shared: &StorageShared) {
  let now = shared.now();
  shared.memory.delete_if(|_, record| record.is_expired(now));

  let keys = match shared.adapter.list_keys().await {
    Ok(keys) => keys,
    Err(err) => {
      shared.diag.warn(&format!("sweep could not list backend keys: {}", err));
      return;
    }
  };

  let checks = keys.iter().map(|key| async move {
    // Values that do not parse as records are left untouched.
    let record = match shared.adapter.get(key).await {
      Ok(Some(record)) => record,
      Ok(None) | Err(_) => return,
    };
    if record.is_expired(shared.now()) {
      if let Err(err) = shared.adapter.remove(key).await {
        shared.diag.warn(&format!("sweep could not remove {:?}: {}", key, err));
      }
    }
  });
  future::join_all(checks).await;
}
