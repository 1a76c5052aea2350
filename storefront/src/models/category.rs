// storefront/src/models/category.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
  pub id: Uuid,
  pub name: String,
  pub slug: String,
  pub description: Option<String>,
  pub display_order: Option<i32>,
  pub featured: Option<bool>,
  pub icon: Option<String>,
  pub image_url: Option<String>,
  pub product_count: Option<i32>,
  pub created_at: Option<DateTime<Utc>>,
}
