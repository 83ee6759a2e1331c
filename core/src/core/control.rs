// bazaar-flow/src/core/control.rs

//! Flow-control signals returned by handlers and the outcome of a run.

/// Signal from a handler telling the pipeline whether to keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt the pipeline without error. Compensation does not run: a stop is a
  /// business decision, not a failure.
  Stop,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step ran (or was skipped by its condition).
  Completed,
  /// A handler returned `PipelineControl::Stop`.
  Stopped,
}
