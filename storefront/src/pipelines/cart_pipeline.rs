// storefront/src/pipelines/cart_pipeline.rs

use crate::errors::AppError;
use crate::models::NewCartLine;
use crate::pipelines::contexts::AddToCartCtx;
use crate::services::notify::messages;

use kidova_pipeline::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{error, info, instrument, warn};

pub const ADD_TO_CART_STEPS: [&str; 3] = ["require_session", "upsert_cart_line", "refresh_cart"];

pub fn register_add_to_cart_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<AddToCartCtx, AppError>::new(&[
    (ADD_TO_CART_STEPS[0], false, None),
    (ADD_TO_CART_STEPS[1], false, None),
    (ADD_TO_CART_STEPS[2], false, None),
  ]);

  p.on_root("require_session", require_session);
  p.on_root("upsert_cart_line", upsert_cart_line);
  p.on_root("refresh_cart", refresh_cart);

  registry.register_pipeline(p);
  info!("Add to Cart pipeline registered.");
}

#[instrument(name = "add_to_cart::require_session", skip_all)]
async fn require_session(ctx_data: ContextData<AddToCartCtx>) -> Result<PipelineControl, AppError> {
  let (signed_in, notifier) = {
    let guard = ctx_data.read();
    (guard.user.is_some(), guard.cart.notifier().clone())
  };
  if !signed_in {
    warn!("Add to cart refused: no session.");
    notifier.error(messages::SIGN_IN_TO_ADD);
    return Err(AppError::SignInRequired);
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "add_to_cart::upsert_cart_line", skip_all)]
async fn upsert_cart_line(ctx_data: ContextData<AddToCartCtx>) -> Result<PipelineControl, AppError> {
  let (line, cart) = {
    let guard = ctx_data.read();
    let user = guard.user.as_ref().ok_or(AppError::SignInRequired)?;
    let line = NewCartLine {
      user_id: user.id,
      product_id: guard.product_id,
      quantity: guard.quantity,
    };
    (line, guard.cart.clone())
  };

  match cart.upsert_line(&line).await {
    Ok(()) => {
      info!(product_id = %line.product_id, quantity = line.quantity, "Cart line written.");
      cart.notifier().success(messages::ADDED_TO_CART);
      Ok(PipelineControl::Continue)
    }
    Err(e) => {
      error!(error = %e, "Error adding to cart.");
      cart.notifier().error(messages::ADD_FAILED);
      Err(e)
    }
  }
}

#[instrument(name = "add_to_cart::refresh_cart", skip_all)]
async fn refresh_cart(ctx_data: ContextData<AddToCartCtx>) -> Result<PipelineControl, AppError> {
  let cart = ctx_data.read().cart.clone();
  cart.refresh().await;
  Ok(PipelineControl::Continue)
}
