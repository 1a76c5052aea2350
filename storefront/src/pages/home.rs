// storefront/src/pages/home.rs

use crate::errors::Result;
use crate::models::{Category, Product};
use crate::services::catalog;
use crate::services::notify::Notice;
use crate::services::visitor::Visitor;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// A product tile in listings.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductCard {
  pub id: Uuid,
  pub slug: String,
  pub name: String,
  pub sku: String,
  pub tagline: Option<String>,
  pub price: Decimal,
  /// Base price, shown struck through while a sale price applies.
  pub original_price: Option<Decimal>,
  pub rating: Option<Decimal>,
  pub review_count: Option<i32>,
  pub image_url: Option<String>,
  pub badge: Option<&'static str>,
  pub age_group: Option<String>,
}

impl From<&Product> for ProductCard {
  fn from(p: &Product) -> Self {
    let badge = if p.bestseller.unwrap_or(false) {
      Some("Bestseller")
    } else if p.new_arrival.unwrap_or(false) {
      Some("New Arrival")
    } else {
      None
    };
    Self {
      id: p.id,
      slug: p.slug.clone(),
      name: p.name.clone(),
      sku: p.sku.clone(),
      tagline: p.tagline.clone(),
      price: p.effective_price(),
      original_price: p.sale_price.map(|_| p.base_price),
      rating: p.rating,
      review_count: p.review_count,
      image_url: p.primary_image_url.clone(),
      badge,
      age_group: p.age_group.clone(),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
  pub featured: Vec<ProductCard>,
  pub categories: Vec<Category>,
  pub cart_count: i64,
  pub signed_in: bool,
  pub notices: Vec<Notice>,
}

impl HomePage {
  pub async fn build(visitor: &Visitor) -> Result<Self> {
    let store = visitor.store().as_ref();
    let featured = catalog::featured_products(store).await?;
    let categories = catalog::categories(store).await?;
    Ok(Self {
      featured: featured.iter().map(ProductCard::from).collect(),
      categories,
      cart_count: visitor.cart().total_items(),
      signed_in: visitor.session().is_signed_in(),
      notices: visitor.drain_notices(),
    })
  }
}
