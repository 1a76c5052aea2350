// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sale price when one is set, otherwise base price.
pub fn effective_price(base_price: Decimal, sale_price: Option<Decimal>) -> Decimal {
  sale_price.unwrap_or(base_price)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
  pub id: Uuid,
  pub sku: String,
  pub slug: String,
  pub name: String,
  pub tagline: Option<String>,
  pub short_description: Option<String>,
  pub long_description: Option<String>,

  pub base_price: Decimal,
  pub sale_price: Option<Decimal>,
  pub discount_percent: Option<i32>,
  pub currency: Option<String>,

  pub in_stock: Option<bool>,
  pub quantity: Option<i32>,
  pub low_stock_threshold: Option<i32>,

  pub primary_image_url: Option<String>,
  pub images: Option<serde_json::Value>,
  pub video_url: Option<String>,

  pub age_group: Option<String>,
  pub difficulty: Option<String>,
  pub assembly_time: Option<String>,
  pub battery_required: Option<bool>,
  pub contents: Option<serde_json::Value>,
  pub learning_outcomes: Option<Vec<String>>,
  pub skills_gained: Option<Vec<String>>,
  pub dimensions: Option<String>,
  pub weight_kg: Option<Decimal>,

  pub rating: Option<Decimal>,
  pub review_count: Option<i32>,
  pub featured: Option<bool>,
  pub bestseller: Option<bool>,
  pub new_arrival: Option<bool>,
  pub status: Option<String>,
  pub category_id: Option<Uuid>,

  pub meta_title: Option<String>,
  pub meta_description: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
  pub fn effective_price(&self) -> Decimal {
    effective_price(self.base_price, self.sale_price)
  }

  /// Only products flagged in stock can go into a cart from the product page.
  pub fn can_add_to_cart(&self) -> bool {
    self.in_stock.unwrap_or(false)
  }
}
