// pipeline/src/core/control.rs

/// What a handler wants the pipeline to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt now. Remaining handlers of this step and all later steps are skipped.
  Stop,
}

/// How a run ended when no handler returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  Completed,
  Stopped,
}
