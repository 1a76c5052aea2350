// tests/context_data_tests.rs
mod common;

use common::*;
use kidova_pipeline::{ContextData, Pipeline, PipelineControl, PipelineError};
use std::time::Duration;

#[tokio::test]
async fn clones_share_the_same_data() {
  let a = ContextData::new(OrderDraft::default());
  let b = a.clone();
  b.write().total_minor = 42;

  assert!(a.ptr_eq(&b));
  assert_eq!(a.read().total_minor, 42);
  assert_eq!(a.snapshot().total_minor, 42);
}

#[tokio::test]
async fn update_returns_closure_result() {
  let ctx = ContextData::new(OrderDraft::default());
  let len = ctx.update(|draft| {
    draft.steps_executed.push("x".to_string());
    draft.steps_executed.len()
  });
  assert_eq!(len, 1);
  assert_eq!(*ctx.map_read(|d| &d.steps_executed), vec!["x".to_string()]);
}

#[tokio::test]
async fn handlers_can_await_between_lock_scopes() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderDraft, TestError>::new(&[("slow_step", false, None)]);
  pipeline.on_root("slow_step", |ctx: ContextData<OrderDraft>| async move {
    let before = ctx.read().total_minor;
    tokio::time::sleep(Duration::from_millis(5)).await;
    ctx.write().total_minor = before + 1;
    Ok::<_, PipelineError>(PipelineControl::Continue)
  });

  let ctx = ContextData::new(OrderDraft::default());
  let handle = tokio::spawn({
    let ctx = ctx.clone();
    async move {
      // Runs concurrently with the pipeline; the lock is only held briefly.
      ctx.write().notes.push_str("concurrent");
    }
  });
  pipeline.run(ctx.clone()).await.unwrap();
  handle.await.unwrap();

  assert_eq!(ctx.read().total_minor, 1);
  assert_eq!(ctx.read().notes, "concurrent");
}

#[test]
fn try_locks_fail_while_writer_is_held() {
  let ctx = ContextData::new(OrderDraft::default());
  let guard = ctx.write();
  assert!(ctx.try_read().is_none());
  assert!(ctx.try_write().is_none());
  drop(guard);
  assert!(ctx.try_read().is_some());
}
