use std::collections::HashMap;

use ahash::RandomState;
use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use parking_lot::Mutex;

use crate::error::StorageError;
use crate::record::Envelope;

/// A joinable, in-flight refill outcome.
pub(crate) type RefillTask = Shared<BoxFuture<'static, Result<Envelope, StorageError>>>;

/// Registry guaranteeing at most one in-flight refill per storage key.
///
/// Join-or-start happens under a single lock acquisition with no await
/// inside it, so two callers can never both observe "no task" for the same
/// key and start duplicate work.
#[derive(Default)]
pub(crate) struct RefillCoordinator {
  tasks: Mutex<HashMap<String, RefillTask, RandomState>>,
}

impl RefillCoordinator {
  /// Joins the task registered under `key`, or registers the future built by
  /// `start` and returns it. A freshly registered task is also handed to
  /// `drive` so it runs to completion even if every caller drops its handle.
  pub(crate) fn join_or_start(
    &self,
    key: &str,
    start: impl FnOnce() -> BoxFuture<'static, Result<Envelope, StorageError>>,
    drive: impl FnOnce(RefillTask),
  ) -> RefillTask {
    let mut tasks = self.tasks.lock();
    if let Some(task) = tasks.get(key) {
      return task.clone();
    }

    let task = start().shared();
    tasks.insert(key.to_string(), task.clone());
    drive(task.clone());
    task
  }

  /// Deregisters `key`. The task itself calls this before yielding its
  /// outcome, so a call arriving after settlement starts fresh work instead
  /// of replaying a finished future.
  pub(crate) fn finish(&self, key: &str) {
    self.tasks.lock().remove(key);
  }
}
