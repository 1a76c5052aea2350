// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Pending,
  Completed,
  Failed,
  Refunded,
}

/// Shipping form of the checkout page, stored verbatim as the order's
/// `shipping_address` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
  pub full_name: String,
  pub email: String,
  pub phone: String,
  pub address: String,
  pub city: String,
  pub state: String,
  pub pincode: String,
}

impl ShippingDetails {
  /// Every field is required; contents are not otherwise checked.
  pub fn validate(&self) -> Result<()> {
    let fields = [
      ("Full name", &self.full_name),
      ("Email", &self.email),
      ("Phone", &self.phone),
      ("Address", &self.address),
      ("City", &self.city),
      ("State", &self.state),
      ("Pincode", &self.pincode),
    ];
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
      Some((label, _)) => Err(AppError::Validation(format!("{} is required", label))),
      None => Ok(()),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Option<Uuid>,
  pub subtotal: Decimal,
  pub shipping_cost: Option<Decimal>,
  pub tax: Option<Decimal>,
  pub total_amount: Decimal,
  pub currency: Option<String>,
  pub shipping_address: ShippingDetails,
  pub billing_address: Option<serde_json::Value>,
  pub order_status: Option<OrderStatus>,
  pub payment_status: Option<PaymentStatus>,
  pub razorpay_order_id: Option<String>,
  pub razorpay_payment_id: Option<String>,
  pub tracking_number: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

/// Insert payload for a checkout attempt. Shipping and tax are always zero.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
  pub user_id: Uuid,
  pub subtotal: Decimal,
  pub shipping_cost: Decimal,
  pub tax: Decimal,
  pub total_amount: Decimal,
  pub shipping_address: ShippingDetails,
  pub order_status: OrderStatus,
  pub payment_status: PaymentStatus,
}

impl NewOrder {
  pub fn pending(user_id: Uuid, subtotal: Decimal, shipping_address: ShippingDetails) -> Self {
    Self {
      user_id,
      subtotal,
      shipping_cost: Decimal::ZERO,
      tax: Decimal::ZERO,
      total_amount: subtotal,
      shipping_address,
      order_status: OrderStatus::Pending,
      payment_status: PaymentStatus::Pending,
    }
  }
}

/// Changes applied once the gateway reports a successful payment.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentConfirmation {
  pub razorpay_payment_id: String,
  pub payment_status: PaymentStatus,
  pub order_status: OrderStatus,
}

impl PaymentConfirmation {
  pub fn paid(razorpay_payment_id: String) -> Self {
    Self {
      razorpay_payment_id,
      payment_status: PaymentStatus::Completed,
      order_status: OrderStatus::Confirmed,
    }
  }
}
