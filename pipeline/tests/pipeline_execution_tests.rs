// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use kidova_pipeline::{ContextData, Pipeline, PipelineControl, PipelineError, PipelineResult, PipelineResultExt};
use serial_test::serial;
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn runs_steps_in_declared_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderDraft, TestError>::new(&[
    ("subtotal", false, None),
    ("shipping", false, None),
    ("tax", false, None),
  ]);
  pipeline.on_root("subtotal", add_amount_handler("subtotal", 399_800));
  pipeline.on_root("shipping", add_amount_handler("shipping", 0));
  pipeline.on_root("tax", add_amount_handler("tax", 0));

  let ctx = ContextData::new(OrderDraft::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  let guard = ctx.read();
  assert_eq!(guard.total_minor, 399_800);
  assert_eq!(guard.steps_executed, vec!["subtotal", "shipping", "tax"]);
}

#[tokio::test]
#[serial]
async fn stop_control_halts_remaining_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderDraft, TestError>::new(&[
    ("create_order", false, None),
    ("open_payment", false, None),
    ("confirm_order", false, None),
  ]);
  pipeline.on_root("create_order", add_amount_handler("create_order", 1));
  pipeline.on_root("open_payment", add_amount_handler("open_payment", 1));
  pipeline.on_root("confirm_order", add_amount_handler("confirm_order", 1));

  let ctx = ContextData::new(OrderDraft {
    stop_at: Some("open_payment".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Stopped);
  assert_eq!(ctx.read().steps_executed, vec!["create_order", "open_payment"]);
}

#[tokio::test]
#[serial]
async fn handler_error_is_returned_unchanged() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderDraft, TestError>::new(&[
    ("create_order", false, None),
    ("create_gateway_order", false, None),
    ("confirm_order", false, None),
  ]);
  pipeline.on_root("create_order", add_amount_handler("create_order", 10));
  pipeline.on_root(
    "create_gateway_order",
    failing_handler("create_gateway_order", "function gateway unavailable"),
  );
  pipeline.on_root("confirm_order", add_amount_handler("confirm_order", 10));

  let ctx = ContextData::new(OrderDraft::default());
  let err = pipeline.run(ctx.clone()).await.unwrap_err();

  assert_eq!(err, TestError::Handler("function gateway unavailable".to_string()));
  let guard = ctx.read();
  assert_eq!(guard.total_minor, 10);
  assert_eq!(guard.steps_executed, vec!["create_order", "create_gateway_order"]);
}

#[tokio::test]
#[serial]
async fn foreign_errors_wrap_as_handler_errors() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderDraft, PipelineError>::new(&[("parse_amount", false, None)]);
  pipeline.on_root("parse_amount", |ctx: ContextData<OrderDraft>| async move {
    let amount = "12.5x".parse::<i64>().handler_err()?;
    ctx.write().total_minor = amount;
    Ok::<_, PipelineError>(PipelineControl::Continue)
  });

  let ctx = ContextData::new(OrderDraft::default());
  let err = pipeline.run(ctx.clone()).await.unwrap_err();

  assert!(matches!(err, PipelineError::HandlerError { .. }));
  assert_eq!(ctx.read().total_minor, 0);
}

#[tokio::test]
#[serial]
async fn skip_condition_skips_step() {
  setup_tracing();
  let skip_when_empty: kidova_pipeline::SkipCondition<OrderDraft> =
    Arc::new(|ctx: ContextData<OrderDraft>| ctx.read().total_minor == 0);
  let mut pipeline = Pipeline::<OrderDraft, TestError>::new(&[
    ("maybe_discount", false, Some(skip_when_empty)),
    ("subtotal", false, None),
  ]);
  pipeline.on_root("maybe_discount", add_amount_handler("maybe_discount", -100));
  pipeline.on_root("subtotal", add_amount_handler("subtotal", 500));

  let ctx = ContextData::new(OrderDraft::default());
  pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().steps_executed, vec!["subtotal"]);
  assert_eq!(ctx.read().total_minor, 500);
}

#[tokio::test]
#[serial]
async fn required_step_without_handler_fails() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderDraft, TestError>::new(&[("subtotal", false, None), ("orphan", false, None)]);
  pipeline.on_root("subtotal", add_amount_handler("subtotal", 1));

  let err = pipeline.run(ContextData::new(OrderDraft::default())).await.unwrap_err();
  match err {
    TestError::Pipeline(msg) => assert!(msg.contains("HandlerMissing"), "unexpected: {}", msg),
    other => panic!("expected pipeline error, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn optional_step_without_handler_is_skipped() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderDraft, TestError>::new(&[("subtotal", false, None), ("notify", true, None)]);
  pipeline.on_root("subtotal", add_amount_handler("subtotal", 1));

  let result = pipeline.run(ContextData::new(OrderDraft::default())).await;
  assert_eq!(result.unwrap(), PipelineResult::Completed);
}

#[tokio::test]
#[serial]
async fn before_on_after_run_in_phase_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderDraft, TestError>::new(&[("confirm_order", false, None)]);
  pipeline.after_root("confirm_order", add_amount_handler("after", 0));
  pipeline.on_root("confirm_order", add_amount_handler("on_1", 0));
  pipeline.before_root("confirm_order", add_amount_handler("before", 0));
  pipeline.on_root("confirm_order", add_amount_handler("on_2", 0));

  let ctx = ContextData::new(OrderDraft::default());
  pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().steps_executed, vec!["before", "on_1", "on_2", "after"]);
}

#[tokio::test]
#[serial]
async fn stop_in_before_phase_skips_on_handlers() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderDraft, TestError>::new(&[("guard", false, None), ("create_order", false, None)]);
  pipeline.before_root("guard", |ctx: ContextData<OrderDraft>| async move {
    ctx.write().steps_executed.push("guard".to_string());
    Ok::<_, PipelineError>(PipelineControl::Stop)
  });
  pipeline.on_root("guard", add_amount_handler("guard_on", 1));
  pipeline.on_root("create_order", add_amount_handler("create_order", 1));

  let ctx = ContextData::new(OrderDraft::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Stopped);
  assert_eq!(ctx.read().steps_executed, vec!["guard"]);
}

#[tokio::test]
#[serial]
async fn structural_edits_change_execution() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderDraft, TestError>::new(&[("subtotal", false, None), ("tax", false, None)]);
  pipeline.insert_before_step("subtotal", "guard", false, None);
  pipeline.insert_after_step("subtotal", "shipping", true, None);
  pipeline.on_root("guard", add_amount_handler("guard", 0));
  pipeline.on_root("subtotal", add_amount_handler("subtotal", 100));
  pipeline.on_root("tax", add_amount_handler("tax", 18));
  assert_eq!(pipeline.step_names(), vec!["guard", "subtotal", "shipping", "tax"]);

  pipeline.remove_step("tax");
  pipeline.remove_step("does_not_exist");

  let ctx = ContextData::new(OrderDraft::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().steps_executed, vec!["guard", "subtotal"]);
  assert_eq!(ctx.read().total_minor, 100);
}

#[tokio::test]
#[serial]
async fn set_optional_and_skip_condition_after_construction() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderDraft, TestError>::new(&[("subtotal", false, None), ("notify", false, None)]);
  pipeline.on_root("subtotal", add_amount_handler("subtotal", 100));
  pipeline.set_optional("notify", true);
  pipeline.set_skip_condition("subtotal", Some(Arc::new(|_ctx: ContextData<OrderDraft>| true)));

  let ctx = ContextData::new(OrderDraft::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert!(ctx.read().steps_executed.is_empty());
}

#[test]
#[should_panic(expected = "is not defined")]
fn registering_handler_for_unknown_step_panics() {
  let mut pipeline = Pipeline::<OrderDraft, TestError>::new(&[("subtotal", false, None)]);
  pipeline.on_root("subtotl", add_amount_handler("subtotl", 1));
}

#[test]
#[should_panic(expected = "already defined")]
fn inserting_duplicate_step_panics() {
  let mut pipeline = Pipeline::<OrderDraft, TestError>::new(&[("subtotal", false, None)]);
  pipeline.insert_after_step("subtotal", "subtotal", false, None);
}
