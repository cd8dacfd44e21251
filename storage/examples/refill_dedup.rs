use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use strata_storage::{LoadItem, StorageBuilder};
use tokio::time::{sleep, Duration};

// A simulated slow upstream service.
async fn fetch_feed(calls: Arc<AtomicUsize>) -> Result<serde_json::Value, strata_storage::StorageError> {
  calls.fetch_add(1, Ordering::SeqCst);
  println!("--- Upstream: received a request, simulating a slow response...");
  sleep(Duration::from_millis(300)).await;
  Ok(json!({ "items": ["a", "b", "c"] }))
}

#[tokio::main]
async fn main() {
  let calls = Arc::new(AtomicUsize::new(0));

  // No backend: data lives in the memory cache only, which is all this demo
  // needs.
  let storage = Arc::new(StorageBuilder::new().build());

  println!("--- Refill De-duplication Demonstration ---");
  println!("Spawning 10 tasks that all load the same uncached key at once.\n");

  let mut tasks = Vec::new();
  for index in 0..10 {
    let storage = storage.clone();
    let calls = calls.clone();
    tasks.push(tokio::spawn(async move {
      let value = storage
        .load(LoadItem::new("feed").refill(move |_args| fetch_feed(calls.clone())))
        .await
        .expect("load failed");
      println!("[task {}] received {}", index, value);
    }));
  }

  for task in tasks {
    task.await.unwrap();
  }

  println!("\nUpstream was called {} time(s).", calls.load(Ordering::SeqCst));
  assert_eq!(calls.load(Ordering::SeqCst), 1);

  println!("Loading the key again: now it is a cache hit.");
  let value = storage.load(LoadItem::new("feed")).await.expect("load failed");
  println!("Received {}", value);
  assert_eq!(calls.load(Ordering::SeqCst), 1);
}
