use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Time-to-live for a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expires {
  /// Expire this many seconds after the write. A zero or negative value
  /// means the data is already stale and not worth persisting at all.
  After(i64),
  /// The record never expires.
  Never,
}

/// A persisted value plus its expiration timestamp.
///
/// Serialized as `{"rawData": ..., "expires": <epoch secs | null>}`. A `null`
/// (or absent) `expires` is the never-expire sentinel. Backends that want to
/// be introspectable by the sweeper must store values in this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
  #[serde(rename = "rawData")]
  pub raw_data: Value,
  #[serde(default)]
  pub expires: Option<i64>,
}

impl Record {
  /// Whether this record is stale at `now` (epoch seconds).
  pub fn is_expired(&self, now: i64) -> bool {
    match self.expires {
      None => false,
      Some(at) => at <= now,
    }
  }
}

/// What a save should do with a value, given its TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExpiryPlan {
  /// Non-positive TTL: succeed without writing anything.
  Skip,
  /// Persist with the given absolute expiration (`None` = never).
  Store(Option<i64>),
}

pub(crate) fn plan_expiry(ttl: Expires, now: i64) -> ExpiryPlan {
  match ttl {
    Expires::Never => ExpiryPlan::Store(None),
    Expires::After(secs) if secs <= 0 => ExpiryPlan::Skip,
    Expires::After(secs) => ExpiryPlan::Store(Some(now + secs)),
  }
}

/// The normalized shape of a refill function's result.
///
/// `code` zero is success by convention; any other value is an
/// application-level failure that is still delivered to the caller but never
/// auto-persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
  pub code: i64,
  pub data: Value,
}

impl Envelope {
  /// Normalizes a refill result.
  ///
  /// An object carrying a non-null `code` or `data` member is taken
  /// field-wise (other members are dropped, a missing `data` becomes null);
  /// any other value is wrapped whole as `data` with `code` zero. The
  /// detection rule is a presence check of those two members only, so an
  /// object that merely resembles an envelope is split up rather than
  /// preserved whole.
  pub fn normalize(value: Value) -> Self {
    match value {
      Value::Object(map)
        if map.get("code").is_some_and(|member| !member.is_null())
          || map.get("data").is_some_and(|member| !member.is_null()) =>
      {
        Envelope {
          code: coerce_code(map.get("code")),
          data: map.get("data").cloned().unwrap_or(Value::Null),
        }
      }
      other => Envelope { code: 0, data: other },
    }
  }

  /// The `{code, data}` object delivered to load callers.
  pub fn into_value(self) -> Value {
    serde_json::json!({ "code": self.code, "data": self.data })
  }
}

/// Coerces a `code` member to an integer. Absent or null means success;
/// a value that cannot be read as a number coerces to -1, so it is delivered
/// but never mistaken for cacheable success.
fn coerce_code(code: Option<&Value>) -> i64 {
  match code {
    None | Some(Value::Null) => 0,
    Some(Value::Number(number)) => number
      .as_i64()
      .or_else(|| number.as_f64().map(|float| float as i64))
      .unwrap_or(-1),
    Some(Value::String(text)) => text.trim().parse::<f64>().map(|float| float as i64).unwrap_or(-1),
    Some(Value::Bool(flag)) => i64::from(*flag),
    Some(_) => -1,
  }
}
