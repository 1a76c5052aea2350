// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::pages::CartPage;
use crate::services::visitor::Visitor;
use crate::web::extractors::CurrentVisitor;

#[derive(Deserialize, Debug)]
pub struct AddToCartRequestPayload {
  pub product_id: Uuid,
  #[serde(default = "default_quantity")]
  pub quantity: i32,
}

fn default_quantity() -> i32 {
  1
}

#[derive(Deserialize, Debug)]
pub struct UpdateQuantityRequestPayload {
  pub quantity: i32,
}

/// The cart page after a cart operation. Failures keep the page body, with the
/// failure's status and its notice.
fn cart_response(visitor: &Visitor, outcome: Result<()>) -> HttpResponse {
  let page = CartPage::build(visitor);
  match outcome {
    Ok(()) => HttpResponse::Ok().json(page),
    Err(e) => {
      debug!(error = %e, "Cart operation failed.");
      HttpResponse::build(e.status_code()).json(page)
    }
  }
}

#[instrument(name = "handler::view_cart", skip_all)]
pub async fn view_cart_handler(current: CurrentVisitor) -> HttpResponse {
  let cart = current.visitor.cart();
  if cart.is_loading() {
    cart.refresh().await;
  }
  HttpResponse::Ok().json(CartPage::build(&current.visitor))
}

#[instrument(
    name = "handler::add_to_cart",
    skip(current, req_payload),
    fields(product_id = %req_payload.product_id, quantity = %req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  current: CurrentVisitor,
  req_payload: web::Json<AddToCartRequestPayload>,
) -> std::result::Result<HttpResponse, AppError> {
  if req_payload.quantity < 1 {
    return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
  }
  let outcome = current
    .visitor
    .cart()
    .add(req_payload.product_id, req_payload.quantity)
    .await;
  Ok(cart_response(&current.visitor, outcome))
}

#[instrument(
    name = "handler::update_cart_item",
    skip_all,
    fields(item_id = %*path, quantity = %req_payload.quantity)
)]
pub async fn update_cart_item_handler(
  current: CurrentVisitor,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateQuantityRequestPayload>,
) -> HttpResponse {
  let outcome = current
    .visitor
    .cart()
    .update_quantity(path.into_inner(), req_payload.quantity)
    .await;
  cart_response(&current.visitor, outcome)
}

#[instrument(name = "handler::remove_cart_item", skip_all, fields(item_id = %*path))]
pub async fn remove_cart_item_handler(current: CurrentVisitor, path: web::Path<Uuid>) -> HttpResponse {
  let outcome = current.visitor.cart().remove(path.into_inner()).await;
  cart_response(&current.visitor, outcome)
}

#[instrument(name = "handler::clear_cart", skip_all)]
pub async fn clear_cart_handler(current: CurrentVisitor) -> HttpResponse {
  let outcome = current.visitor.cart().clear().await;
  cart_response(&current.visitor, outcome)
}
