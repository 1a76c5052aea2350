// storefront/src/pages/product.rs

use crate::errors::Result;
use crate::models::{Product, Review};
use crate::services::catalog;
use crate::services::notify::Notice;
use crate::services::visitor::Visitor;

use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
  pub product: Product,
  pub price: Decimal,
  pub discount_percent: Option<i32>,
  pub stock_label: &'static str,
  pub can_add_to_cart: bool,
  pub reviews: Vec<Review>,
  pub cart_count: i64,
  pub notices: Vec<Notice>,
}

impl ProductPage {
  pub async fn build(visitor: &Visitor, slug: &str) -> Result<Self> {
    let store = visitor.store().as_ref();
    let product = catalog::product_by_slug(store, slug).await?;
    let reviews = catalog::reviews_for(store, product.id).await?;
    let can_add_to_cart = product.can_add_to_cart();
    Ok(Self {
      price: product.effective_price(),
      discount_percent: product.discount_percent,
      stock_label: if can_add_to_cart { "In Stock" } else { "Out of Stock" },
      can_add_to_cart,
      reviews,
      cart_count: visitor.cart().total_items(),
      notices: visitor.drain_notices(),
      product,
    })
  }
}
