// tests/common/mod.rs
#![allow(dead_code)]

use kidova_pipeline::{ContextData, PipelineControl, PipelineError};
use once_cell::sync::Lazy;
use tracing::Level;

/// Context used by most engine tests: an order total being built up step by
/// step, plus a log of which steps ran.
#[derive(Clone, Debug, Default)]
pub struct OrderDraft {
  pub total_minor: i64,
  pub notes: String,
  pub steps_executed: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("pipeline error: {0}")]
  Pipeline(String),

  #[error("handler failed: {0}")]
  Handler(String),
}

impl From<PipelineError> for TestError {
  fn from(e: PipelineError) -> Self {
    TestError::Pipeline(format!("{:?}", e))
  }
}

/// Adds `amount` to the draft, records `step_name` and stops if the draft asks
/// to stop at this step.
pub fn add_amount_handler(step_name: &'static str, amount: i64) -> kidova_pipeline::Handler<OrderDraft, TestError> {
  Box::new(move |ctx: ContextData<OrderDraft>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.total_minor += amount;
      guard.notes.push_str(step_name);
      guard.notes.push(';');
      guard.steps_executed.push(step_name.to_string());
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn failing_handler(step_name: &'static str, message: &'static str) -> kidova_pipeline::Handler<OrderDraft, TestError> {
  Box::new(move |ctx: ContextData<OrderDraft>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err::<PipelineControl, _>(TestError::Handler(message.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
