/// Substring-based protection list consulted by the bulk clear operations.
///
/// A key is protected when it contains any entry as a substring. Clears merge
/// the instance-level list with a call-level one, call-level entries first.
#[derive(Debug, Clone, Default)]
pub struct WhiteList {
  entries: Vec<String>,
}

impl WhiteList {
  pub fn new<I, S>(entries: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      entries: entries.into_iter().map(Into::into).collect(),
    }
  }

  /// Returns a list containing `extra` followed by this list's entries.
  pub fn merged_with(&self, extra: &[String]) -> Self {
    let mut entries = Vec::with_capacity(extra.len() + self.entries.len());
    entries.extend(extra.iter().cloned());
    entries.extend(self.entries.iter().cloned());
    Self { entries }
  }

  /// Whether `key` is protected from clearing.
  pub fn is_protected(&self, key: &str) -> bool {
    self.entries.iter().any(|entry| key.contains(entry))
  }

  /// Filters `keys` down to the ones that may be cleared.
  pub fn filter_unprotected<I>(&self, keys: I) -> Vec<String>
  where
    I: IntoIterator<Item = String>,
  {
    keys.into_iter().filter(|key| !self.is_protected(key)).collect()
  }
}
