/// Sink for the facade's diagnostic messages.
///
/// The engine never fails an operation on account of a diagnostic; sinks
/// receive fire-and-forget notices about fallbacks and swallowed background
/// errors (auto-save failures, sweep hiccups and the like).
pub trait Diagnostics: Send + Sync {
  fn info(&self, message: &str);
  fn warn(&self, message: &str);
  fn error(&self, message: &str);
}

/// Forwards diagnostics to the `tracing` facade.
///
/// This is the default sink. It stays inert until a subscriber is installed,
/// which keeps test output clean without special-casing test builds.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
  fn info(&self, message: &str) {
    tracing::info!(target: "strata_storage", "{}", message);
  }

  fn warn(&self, message: &str) {
    tracing::warn!(target: "strata_storage", "{}", message);
  }

  fn error(&self, message: &str) {
    tracing::error!(target: "strata_storage", "{}", message);
  }
}

/// Discards every diagnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
  fn info(&self, _message: &str) {}

  fn warn(&self, _message: &str) {}

  fn error(&self, _message: &str) {}
}
