// storefront/src/services/functions.rs

//! Invocable backend functions (`{functions_url}/{name}`).

use crate::config::AppConfig;
use crate::errors::{AppError, Result};

use async_trait::async_trait;
use reqwest::{header, Client};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const CREATE_PAYMENT_ORDER: &str = "create-razorpay-order";

/// Amount in minor currency units (paise for INR), rounded half away from zero.
pub fn minor_units(amount: Decimal) -> Result<i64> {
  (amount * Decimal::ONE_HUNDRED)
    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    .to_i64()
    .ok_or_else(|| AppError::Validation(format!("Amount {} is out of range", amount)))
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CustomerInfo {
  pub name: String,
  pub email: String,
  pub phone: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrderRequest {
  pub amount: i64,
  pub currency: String,
  pub order_id: Uuid,
  pub customer_info: CustomerInfo,
}

/// Gateway-side order created for one checkout attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayOrder {
  pub razorpay_key_id: String,
  pub amount: i64,
  pub currency: String,
  pub razorpay_order_id: String,
}

#[async_trait]
pub trait FunctionGateway: Send + Sync {
  async fn create_payment_order(&self, access_token: &str, request: &PaymentOrderRequest) -> Result<GatewayOrder>;
}

#[derive(Debug, Clone)]
pub struct HttpFunctionGateway {
  client: Client,
  functions_url: String,
  api_key: String,
}

impl HttpFunctionGateway {
  pub fn new(client: Client, config: &AppConfig) -> Self {
    Self {
      client,
      functions_url: config.functions_url.clone(),
      api_key: config.supabase_anon_key.clone(),
    }
  }
}

#[async_trait]
impl FunctionGateway for HttpFunctionGateway {
  #[instrument(
    name = "HttpFunctionGateway::create_payment_order",
    skip_all,
    fields(order_id = %request.order_id, amount = request.amount),
    err(Display)
  )]
  async fn create_payment_order(&self, access_token: &str, request: &PaymentOrderRequest) -> Result<GatewayOrder> {
    let url = format!("{}/{}", self.functions_url, CREATE_PAYMENT_ORDER);
    let response = self
      .client
      .post(url)
      .header("apikey", &self.api_key)
      .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
      .json(request)
      .send()
      .await
      .map_err(|e| AppError::Function(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      warn!(status = status.as_u16(), %body, "Payment order function failed.");
      return Err(AppError::Function(format!("{} returned {}: {}", CREATE_PAYMENT_ORDER, status.as_u16(), body)));
    }

    let order: GatewayOrder = response
      .json()
      .await
      .map_err(|e| AppError::Function(format!("Unexpected response from {}: {}", CREATE_PAYMENT_ORDER, e)))?;
    info!(razorpay_order_id = %order.razorpay_order_id, "Gateway order created.");
    Ok(order)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  #[test]
  fn minor_units_rounds_half_away_from_zero() {
    assert_eq!(minor_units(Decimal::from(8496)).ok(), Some(849_600));
    assert_eq!(minor_units(Decimal::from_str("19.995").unwrap()).ok(), Some(2000));
    assert_eq!(minor_units(Decimal::from_str("0.004").unwrap()).ok(), Some(0));
    assert_eq!(minor_units(Decimal::from_str("-0.005").unwrap()).ok(), Some(-1));
    assert_eq!(minor_units(Decimal::from_str("-19.994").unwrap()).ok(), Some(-1999));
  }
}
