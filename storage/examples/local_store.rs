use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use strata_storage::{
  Backend, Expires, KeyIndexedStore, LoadItem, SaveItem, StorageBuilder, StorageError,
};

// A localStorage-shaped backend over an insertion-ordered vector.
#[derive(Default)]
struct VecStore {
  items: Mutex<Vec<(String, String)>>,
}

impl KeyIndexedStore for VecStore {
  fn get_item(&self, key: &str) -> Option<String> {
    self.items.lock().iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
  }

  fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
    let mut items = self.items.lock();
    match items.iter_mut().find(|(k, _)| k == key) {
      Some(slot) => slot.1 = value.to_string(),
      None => items.push((key.to_string(), value.to_string())),
    }
    Ok(())
  }

  fn remove_item(&self, key: &str) {
    self.items.lock().retain(|(k, _)| k != key);
  }

  fn length(&self) -> usize {
    self.items.lock().len()
  }

  fn key_at(&self, index: usize) -> Option<String> {
    self.items.lock().get(index).map(|(k, _)| k.clone())
  }
}

#[tokio::main]
async fn main() {
  let store = Arc::new(VecStore::default());
  let storage = StorageBuilder::new()
    .backend(Backend::KeyIndexed(store.clone()))
    .white_list(["settings"])
    .build();

  storage
    .save(SaveItem::new("settings-theme", json!("dark")).expires(Expires::Never))
    .await
    .expect("save failed");
  storage
    .save(SaveItem::new("session", json!({ "user": "steve" })).expires(Expires::After(3600)))
    .await
    .expect("save failed");

  let theme = storage.load(LoadItem::new("settings-theme")).await.expect("load failed");
  println!("theme: {}", theme);

  println!("keys before clear: {:?}", storage.get_info().await.unwrap().keys);

  // The instance whitelist protects the settings entry.
  storage.clear(&[]).await.expect("clear failed");
  println!("keys after clear:  {:?}", storage.get_info().await.unwrap().keys);

  // The synchronous mirror works against this backend shape.
  let theme = storage.load_sync(LoadItem::new("settings-theme")).expect("load_sync failed");
  println!("sync theme: {:?}", theme);
}
