/// Yes/no confirmation for destructive operations.
pub trait Confirm {
  fn confirm(&mut self, message: &str) -> bool;
}

/// Answers every prompt with a fixed value.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
  fn confirm(&mut self, message: &str) -> bool {
    tracing::debug!(message, answer = self.0, "auto-confirmed prompt");
    self.0
  }
}

impl<F: FnMut(&str) -> bool> Confirm for F {
  fn confirm(&mut self, message: &str) -> bool {
    self(message)
  }
}
