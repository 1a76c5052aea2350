// storefront/src/models/profile.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public profile kept next to the auth user; `id` is the auth user id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
  pub id: Uuid,
  pub email: Option<String>,
  pub full_name: Option<String>,
  pub avatar_url: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}
