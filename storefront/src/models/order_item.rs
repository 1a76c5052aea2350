// storefront/src/models/order_item.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CartItem;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub unit_price: Decimal,
  pub total_price: Decimal,
  pub created_at: Option<DateTime<Utc>>,
}

/// Purchase-time snapshot of a cart line.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderItem {
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub unit_price: Decimal,
  pub total_price: Decimal,
}

impl NewOrderItem {
  pub fn from_cart_item(order_id: Uuid, item: &CartItem) -> Self {
    Self {
      order_id,
      product_id: item.product_id,
      quantity: item.quantity,
      unit_price: item.unit_price(),
      total_price: item.line_total(),
    }
  }
}
