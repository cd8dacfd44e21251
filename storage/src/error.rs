use std::fmt;

/// Errors surfaced by the storage facade.
///
/// Every variant is cheap to clone so the outcome of a shared refill can be
/// delivered to all of its waiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
  /// Neither a `key` prefix nor a `full_key` was supplied. Detected
  /// synchronously, before any I/O is attempted.
  MissingKey,
  /// No fresh cached or stored record exists for `key` and no refill
  /// function is available.
  NotFound {
    key: String,
  },
  /// A synchronous operation was invoked against a backend that has no
  /// synchronous capability. This signals a configuration error, not a
  /// transient fault.
  SyncUnsupported,
  /// The backend reported an I/O or serialization failure.
  Backend(String),
  /// A refill function failed; the message is delivered verbatim to every
  /// waiter that joined the refill.
  Refill(String),
}

impl fmt::Display for StorageError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StorageError::MissingKey => write!(f, "a key or full key is required"),
      StorageError::NotFound { key } => {
        write!(f, "no usable record and no refill function: {{\"key\":\"{}\"}}", key)
      }
      StorageError::SyncUnsupported => {
        write!(f, "this storage backend does not support synchronous operations")
      }
      StorageError::Backend(message) => write!(f, "storage backend error: {}", message),
      StorageError::Refill(message) => write!(f, "refill failed: {}", message),
    }
  }
}

impl std::error::Error for StorageError {}
