// bazaar-flow/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures raised by the engine itself, as opposed to failures returned by
/// user handlers (those use the pipeline's own error type).
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No pipeline registered for context type {context_type}")]
  NotRegistered { context_type: String },

  #[error("Type mismatch during context downcast (expected {expected_type})")]
  TypeMismatch { expected_type: String },

  #[error("Compensation for step '{step_name}' failed. Source: {source}")]
  CompensationFailed {
    step_name: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Error in handler or external operation. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },
}

impl From<AnyhowError> for FlowError {
  fn from(err: AnyhowError) -> Self {
    FlowError::HandlerError { source: err }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
