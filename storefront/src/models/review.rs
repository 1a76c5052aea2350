// storefront/src/models/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
  pub id: Uuid,
  pub product_id: Uuid,
  pub user_id: Uuid,
  pub rating: i32,
  pub comment: Option<String>,
  pub helpful_count: Option<i32>,
  pub verified_purchase: Option<bool>,
  pub created_at: Option<DateTime<Utc>>,
}
