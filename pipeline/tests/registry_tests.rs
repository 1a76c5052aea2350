// tests/registry_tests.rs
mod common;

use common::*;
use kidova_pipeline::{ContextData, Pipeline, PipelineControl, PipelineError, PipelineResult, Registry};

#[derive(Clone, Debug, Default)]
struct AddToCartCtx {
  quantity: i32,
  upserted: bool,
}

#[derive(Clone, Debug, Default)]
struct ClearCartCtx {
  cleared_rows: usize,
}

fn add_to_cart_pipeline() -> Pipeline<AddToCartCtx, TestError> {
  let mut p = Pipeline::<AddToCartCtx, TestError>::new(&[("validate", false, None), ("upsert", false, None)]);
  p.on_root("validate", |ctx: ContextData<AddToCartCtx>| async move {
    if ctx.read().quantity < 1 {
      return Err(TestError::Handler("quantity below one".to_string()));
    }
    Ok(PipelineControl::Continue)
  });
  p.on_root("upsert", |ctx: ContextData<AddToCartCtx>| async move {
    ctx.write().upserted = true;
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  p
}

#[tokio::test]
async fn dispatches_by_context_type() {
  setup_tracing();
  let registry = Registry::<TestError>::new();
  registry.register_pipeline(add_to_cart_pipeline());

  let mut clear = Pipeline::<ClearCartCtx, TestError>::new(&[("delete_rows", false, None)]);
  clear.on_root("delete_rows", |ctx: ContextData<ClearCartCtx>| async move {
    ctx.write().cleared_rows = 3;
    Ok::<_, PipelineError>(PipelineControl::Continue)
  });
  registry.register_pipeline(clear);

  let add_ctx = ContextData::new(AddToCartCtx {
    quantity: 2,
    upserted: false,
  });
  assert_eq!(registry.run(add_ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert!(add_ctx.read().upserted);

  let clear_ctx = ContextData::new(ClearCartCtx::default());
  assert_eq!(registry.run(clear_ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(clear_ctx.read().cleared_rows, 3);
}

#[tokio::test]
async fn unregistered_context_type_is_a_configuration_error() {
  setup_tracing();
  let registry = Registry::<TestError>::new();
  assert!(!registry.is_registered::<ClearCartCtx>());

  let err = registry.run(ContextData::new(ClearCartCtx::default())).await.unwrap_err();
  match err {
    TestError::Pipeline(msg) => {
      assert!(msg.contains("ConfigurationError"), "unexpected: {}", msg);
      assert!(msg.contains("ClearCartCtx"), "unexpected: {}", msg);
    }
    other => panic!("expected configuration error, got {:?}", other),
  }
}

#[tokio::test]
async fn handler_errors_propagate_through_registry() {
  setup_tracing();
  let registry = Registry::<TestError>::new();
  registry.register_pipeline(add_to_cart_pipeline());

  let ctx = ContextData::new(AddToCartCtx {
    quantity: 0,
    upserted: false,
  });
  let err = registry.run(ctx.clone()).await.unwrap_err();
  assert_eq!(err, TestError::Handler("quantity below one".to_string()));
  assert!(!ctx.read().upserted);
}

#[tokio::test]
async fn re_registering_replaces_pipeline() {
  setup_tracing();
  let registry = Registry::<TestError>::new();
  registry.register_pipeline(add_to_cart_pipeline());
  assert_eq!(
    registry.steps_of::<AddToCartCtx>(),
    Some(vec!["validate".to_string(), "upsert".to_string()])
  );

  let mut replacement = Pipeline::<AddToCartCtx, TestError>::new(&[("only", false, None)]);
  replacement.on_root("only", |_ctx: ContextData<AddToCartCtx>| async move {
    Ok::<_, TestError>(PipelineControl::Stop)
  });
  registry.register_pipeline(replacement);

  assert_eq!(registry.steps_of::<AddToCartCtx>(), Some(vec!["only".to_string()]));
  let result = registry.run(ContextData::new(AddToCartCtx::default())).await.unwrap();
  assert_eq!(result, PipelineResult::Stopped);
}
