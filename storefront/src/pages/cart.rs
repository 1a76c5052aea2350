// storefront/src/pages/cart.rs

use crate::models::CartItem;
use crate::services::cart::CartState;
use crate::services::notify::Notice;
use crate::services::visitor::Visitor;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CartLineView {
  pub id: Uuid,
  pub product_id: Uuid,
  pub name: String,
  pub slug: String,
  pub image_url: Option<String>,
  pub quantity: i32,
  pub unit_price: Decimal,
  pub line_total: Decimal,
  /// The decrement control is disabled at one.
  pub can_decrement: bool,
}

impl From<&CartItem> for CartLineView {
  fn from(item: &CartItem) -> Self {
    Self {
      id: item.id,
      product_id: item.product_id,
      name: item.product.name.clone(),
      slug: item.product.slug.clone(),
      image_url: item.product.primary_image_url.clone(),
      quantity: item.quantity,
      unit_price: item.unit_price(),
      line_total: item.line_total(),
      can_decrement: item.quantity > 1,
    }
  }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderSummary {
  pub total_items: i64,
  pub subtotal: Decimal,
  pub shipping: Decimal,
  pub shipping_label: &'static str,
  pub total: Decimal,
}

impl OrderSummary {
  pub fn of(state: &CartState) -> Self {
    let subtotal = state.total_price();
    Self {
      total_items: state.total_items(),
      subtotal,
      shipping: Decimal::ZERO,
      shipping_label: "FREE",
      total: subtotal,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct CartPage {
  pub loading: bool,
  pub empty: bool,
  pub lines: Vec<CartLineView>,
  pub summary: OrderSummary,
  pub notices: Vec<Notice>,
}

impl CartPage {
  pub fn build(visitor: &Visitor) -> Self {
    let state = visitor.cart().snapshot();
    Self {
      loading: state.loading,
      empty: state.items.is_empty(),
      lines: state.items.iter().map(CartLineView::from).collect(),
      summary: OrderSummary::of(&state),
      notices: visitor.drain_notices(),
    }
  }
}
