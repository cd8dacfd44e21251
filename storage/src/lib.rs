//! A client-side caching facade that unifies heterogeneous key-value storage
//! backends behind one uniform asynchronous API.
//!
//! # Features
//! - **One API, three backend shapes**: synchronous index-enumerable stores,
//!   future-returning stores and callback-style stores all satisfy the same
//!   capability-normalized adapter contract.
//! - **Memory-first reads**: an in-memory mirror serves fresh records with no
//!   I/O at all.
//! - **Time-based expiration**: absolute expiration timestamps with a
//!   never-expire sentinel, enforced on every read.
//! - **Refill de-duplication**: concurrent cache misses for one key share a
//!   single in-flight refill and all observe its outcome.
//! - **Background sweeping**: a per-instance timer task evicts expired
//!   records from both the mirror and the backend.
//! - **Sync mirror**: synchronous variants of every operation for backends
//!   with a native synchronous capability.

// Public modules that form the API
pub mod adapter;
pub mod builder;
pub mod clock;
pub mod diag;
pub mod error;
pub mod handles;
pub mod key;
pub mod params;
pub mod record;
pub mod whitelist;

// Internal, crate-only modules
mod memory;
mod refill;
mod shared;
mod task;

// Re-export the primary user-facing types for convenience
pub use adapter::{
  AsyncStore, Backend, BackendKind, CallbackStore, Done, KeyIndexedStore, StorageAdapter,
  StorageInfo,
};
pub use builder::StorageBuilder;
pub use clock::{Clock, SystemClock};
pub use diag::{Diagnostics, NoopDiagnostics, TracingDiagnostics};
pub use error::StorageError;
pub use handles::Storage;
pub use params::{LoadItem, RefillArgs, RefillFn, RemoveItem, SaveItem, SyncParams};
pub use record::{Envelope, Expires, Record};
pub use whitelist::WhiteList;
