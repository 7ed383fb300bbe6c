use tracing::info;

/// Receives progress updates while a batch runs.
pub trait ProgressSink {
  /// `fraction` is in `0.0..=1.0`.
  fn report(&mut self, label: &str, fraction: f32);

  fn clear(&mut self);
}

/// Progress sink that emits tracing events.
#[derive(Debug, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
  fn report(&mut self, label: &str, fraction: f32) {
    info!(percent = (fraction * 100.0).round() as u32, "{label}");
  }

  fn clear(&mut self) {}
}

/// Fraction of a batch completed, `0.0` for an empty batch.
pub fn progress_fraction(total: usize, remaining: usize) -> f32 {
  if total == 0 {
    return 0.0;
  }
  total.saturating_sub(remaining) as f32 / total as f32
}
