use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::error::StorageError;
use crate::params::SyncParams;

/// The set escaped by `encodeURIComponent`: everything except
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'!')
  .remove(b'~')
  .remove(b'*')
  .remove(b'\'')
  .remove(b'(')
  .remove(b')');

/// Renders sync params as `k1=v1&k2=v2` with percent-encoded values, keys in
/// their insertion order.
pub fn query_encode(params: &SyncParams) -> String {
  params
    .iter()
    .map(|(key, value)| format!("{}={}", key, utf8_percent_encode(&scalar_text(value), COMPONENT)))
    .collect::<Vec<_>>()
    .join("&")
}

/// Text form of a param value: strings verbatim, everything else as JSON.
fn scalar_text(value: &Value) -> String {
  match value {
    Value::String(text) => text.clone(),
    other => other.to_string(),
  }
}

/// Derives the storage key for a logical `key` prefix and optional params.
///
/// Pure and deterministic: cache lookups and refill de-duplication rely on
/// the same inputs always producing the same key.
pub fn build_key(storage_prefix: &str, key: &str, params: &SyncParams) -> String {
  if params.is_empty() {
    format!("{}{}", storage_prefix, key)
  } else {
    format!("{}{}?{}", storage_prefix, key, query_encode(params))
  }
}

/// Resolves the full storage key for an operation, preferring an explicit
/// `full_key`. Fails before any I/O when neither a key nor a full key is
/// given.
pub fn resolve_full_key(
  storage_prefix: &str,
  key: &str,
  full_key: &str,
  params: &SyncParams,
) -> Result<String, StorageError> {
  if !full_key.is_empty() {
    return Ok(full_key.to_string());
  }
  if key.is_empty() {
    return Err(StorageError::MissingKey);
  }
  Ok(build_key(storage_prefix, key, params))
}
