mod common;

use std::sync::Arc;

use serde_json::json;

use common::{store_key, ManualClock, MemoryLocalStore};
use strata_storage::{Backend, Expires, LoadItem, SaveItem, StorageBuilder, StorageError};

fn build(store: &Arc<MemoryLocalStore>, clock: &ManualClock) -> strata_storage::Storage {
  StorageBuilder::new()
    .backend(Backend::KeyIndexed(store.clone()))
    .clock(clock.clone())
    .auto_sweep(false)
    .build()
}

#[tokio::test]
async fn save_then_load_round_trips() {
  let store = Arc::new(MemoryLocalStore::default());
  let clock = ManualClock::new(1_000);
  let storage = build(&store, &clock);

  let data = json!({ "name": "steve", "age": 21 });
  storage
    .save(SaveItem::new("user", data.clone()).expires(Expires::After(60)))
    .await
    .unwrap();

  let loaded = storage.load(LoadItem::new("user")).await.unwrap();
  assert_eq!(loaded, data);
}

#[tokio::test]
async fn save_writes_the_record_wire_format() {
  let store = Arc::new(MemoryLocalStore::default());
  let clock = ManualClock::new(1_000);
  let storage = build(&store, &clock);

  storage
    .save(SaveItem::new("user", json!("payload")).expires(Expires::After(60)))
    .await
    .unwrap();

  let raw = store.raw(&store_key("user")).unwrap();
  let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
  assert_eq!(parsed, json!({ "rawData": "payload", "expires": 1_060 }));
}

#[tokio::test]
async fn full_key_bypasses_derivation() {
  let store = Arc::new(MemoryLocalStore::default());
  let clock = ManualClock::new(1_000);
  let storage = build(&store, &clock);

  storage
    .save(SaveItem::new("ignored", json!(1)).full_key("exact-key"))
    .await
    .unwrap();

  assert!(store.raw("exact-key").is_some());
  let loaded = storage
    .load(LoadItem::new("").full_key("exact-key"))
    .await
    .unwrap();
  assert_eq!(loaded, json!(1));
}

#[tokio::test]
async fn missing_key_fails_before_any_io() {
  let store = Arc::new(MemoryLocalStore::default());
  let clock = ManualClock::new(1_000);
  let storage = build(&store, &clock);

  let err = storage.save(SaveItem::new("", json!(1))).await.unwrap_err();
  assert_eq!(err, StorageError::MissingKey);

  let err = storage.load(LoadItem::new("")).await.unwrap_err();
  assert_eq!(err, StorageError::MissingKey);

  assert_eq!(store.item_count(), 0);
}

#[tokio::test]
async fn load_without_record_or_refill_reports_the_key() {
  let store = Arc::new(MemoryLocalStore::default());
  let clock = ManualClock::new(1_000);
  let storage = build(&store, &clock);

  let err = storage.load(LoadItem::new("absent")).await.unwrap_err();
  assert_eq!(
    err,
    StorageError::NotFound {
      key: store_key("absent"),
    }
  );
  assert!(err.to_string().contains(&store_key("absent")));
}

#[tokio::test]
async fn save_many_preserves_independence_and_load_many_order() {
  let store = Arc::new(MemoryLocalStore::default());
  let clock = ManualClock::new(1_000);
  let storage = build(&store, &clock);

  storage
    .save_many(vec![
      SaveItem::new("a", json!("first")),
      SaveItem::new("b", json!("second")),
      SaveItem::new("c", json!("third")),
    ])
    .await
    .unwrap();

  let loaded = storage
    .load_many(vec![
      LoadItem::new("c"),
      LoadItem::new("a"),
      LoadItem::new("b"),
    ])
    .await
    .unwrap();
  assert_eq!(loaded, vec![json!("third"), json!("first"), json!("second")]);
}

#[tokio::test]
async fn save_many_settles_every_item_before_failing() {
  let store = Arc::new(MemoryLocalStore::default());
  let clock = ManualClock::new(1_000);
  let storage = build(&store, &clock);

  let err = storage
    .save_many(vec![
      SaveItem::new("ok", json!(1)),
      SaveItem::new("", json!(2)),
      SaveItem::new("also-ok", json!(3)),
    ])
    .await
    .unwrap_err();

  assert_eq!(err, StorageError::MissingKey);
  // The healthy siblings still completed.
  assert!(store.raw(&store_key("ok")).is_some());
  assert!(store.raw(&store_key("also-ok")).is_some());
}

#[tokio::test]
async fn disabled_cache_reads_the_backend_every_time() {
  let store = Arc::new(MemoryLocalStore::default());
  let clock = ManualClock::new(1_000);
  let storage = build(&store, &clock);

  storage
    .save(SaveItem::new("volatile", json!("from-save")).enable_cache(false))
    .await
    .unwrap();

  // Mutate the backend behind the facade's back; a cache-disabled load must
  // observe it.
  store.put_raw(
    &store_key("volatile"),
    &serde_json::to_string(&json!({ "rawData": "from-backend", "expires": 2_000 })).unwrap(),
  );

  let loaded = storage
    .load(LoadItem::new("volatile").enable_cache(false))
    .await
    .unwrap();
  assert_eq!(loaded, json!("from-backend"));
}

#[tokio::test]
async fn remove_is_idempotent() {
  let store = Arc::new(MemoryLocalStore::default());
  let clock = ManualClock::new(1_000);
  let storage = build(&store, &clock);

  storage.save(SaveItem::new("gone", json!(1))).await.unwrap();
  storage.remove("gone").await.unwrap();
  storage.remove("gone").await.unwrap();
  storage.remove("never-existed").await.unwrap();

  let err = storage.load(LoadItem::new("gone")).await.unwrap_err();
  assert!(matches!(err, StorageError::NotFound { .. }));
}

#[tokio::test]
async fn remove_prefers_the_full_key() {
  let store = Arc::new(MemoryLocalStore::default());
  let clock = ManualClock::new(1_000);
  let storage = build(&store, &clock);

  storage.save(SaveItem::new("kept", json!(1))).await.unwrap();
  storage
    .save(SaveItem::new("ignored", json!(2)).full_key("victim"))
    .await
    .unwrap();

  storage
    .remove(strata_storage::RemoveItem::full_key("victim"))
    .await
    .unwrap();

  assert!(store.raw("victim").is_none());
  assert!(store.raw(&store_key("kept")).is_some());

  let err = storage.remove("").await.unwrap_err();
  assert_eq!(err, StorageError::MissingKey);
}
