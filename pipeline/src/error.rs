// pipeline/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Context type mismatch (expected {expected_type}, at: '{step_name}')")]
  TypeMismatch { step_name: String, expected_type: String },

  #[error("Handler failed. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },

  #[error("Configuration error for '{step_name}': {message}")]
  ConfigurationError { step_name: String, message: String },

  #[error("Internal pipeline error: {0}")]
  Internal(String),
}

impl From<AnyhowError> for PipelineError {
  fn from(err: AnyhowError) -> Self {
    PipelineError::HandlerError { source: err }
  }
}

/// Convenience for handler code that wants to turn any error into a
/// `PipelineError::HandlerError` with `?`.
pub trait PipelineResultExt<T> {
  fn handler_err(self) -> Result<T, PipelineError>;
}

impl<T, E> PipelineResultExt<T> for Result<T, E>
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn handler_err(self) -> Result<T, PipelineError> {
    self.map_err(|e| PipelineError::HandlerError {
      source: AnyhowError::new(e),
    })
  }
}
