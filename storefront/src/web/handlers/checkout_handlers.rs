// storefront/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::ShippingDetails;
use crate::pages::{CheckoutPage, CheckoutStarted};
use crate::services::notify::messages;
use crate::services::payment::PaymentResponse;
use crate::web::extractors::CurrentVisitor;

#[instrument(name = "handler::checkout_page", skip_all)]
pub async fn checkout_page_handler(current: CurrentVisitor) -> Result<HttpResponse, AppError> {
  let page = CheckoutPage::build(&current.visitor).await?;
  Ok(HttpResponse::Ok().json(page))
}

/// Creates the pending order and gateway order and returns what the page
/// needs to open the payment widget.
#[instrument(name = "handler::start_checkout", skip_all)]
pub async fn start_checkout_handler(
  current: CurrentVisitor,
  req_payload: web::Json<ShippingDetails>,
) -> Result<HttpResponse, AppError> {
  let payment = current.visitor.begin_checkout(req_payload.into_inner()).await?;
  info!(gateway_order_id = %payment.options.order_id, "Payment widget ready.");
  Ok(HttpResponse::Ok().json(CheckoutStarted {
    payment,
    notices: current.visitor.drain_notices(),
  }))
}

/// Receives the payment widget's success handler.
#[instrument(
    name = "handler::payment_callback",
    skip_all,
    fields(payment_id = %req_payload.razorpay_payment_id)
)]
pub async fn payment_callback_handler(
  current: CurrentVisitor,
  req_payload: web::Json<PaymentResponse>,
) -> Result<HttpResponse, AppError> {
  current.visitor.complete_payment(req_payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": messages::ORDER_PLACED,
      "redirect": "/",
      "notices": current.visitor.drain_notices(),
  })))
}
