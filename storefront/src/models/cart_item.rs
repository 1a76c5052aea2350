// storefront/src/models/cart_item.rs

use crate::store::{Select, Table};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upsert payload of a `cart_items` row, unique on `(user_id, product_id)`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCartLine {
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
}

impl NewCartLine {
  pub const CONFLICT_KEY: [&'static str; 2] = ["user_id", "product_id"];
}

/// The product fields shown next to a cart line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartProduct {
  pub name: String,
  pub primary_image_url: Option<String>,
  pub sale_price: Option<Decimal>,
  pub base_price: Decimal,
  pub slug: String,
}

/// A cart line joined with its product, as held by the cart store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
  pub id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub product: CartProduct,
}

impl CartItem {
  pub fn selection() -> Select {
    Select::columns(&["id", "product_id", "quantity"]).embed(
      "product",
      Table::Products,
      "product_id",
      &["name", "primary_image_url", "sale_price", "base_price", "slug"],
    )
  }

  pub fn unit_price(&self) -> Decimal {
    super::effective_price(self.product.base_price, self.product.sale_price)
  }

  pub fn line_total(&self) -> Decimal {
    self.unit_price() * Decimal::from(self.quantity)
  }
}
