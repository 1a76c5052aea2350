// storefront/src/services/catalog.rs

//! Read-only catalog queries.

use crate::errors::{AppError, Result};
use crate::models::{Category, Product, Profile, Review};
use crate::store::{decode_rows, Filter, RemoteStore, Select, Table};

use tracing::instrument;
use uuid::Uuid;

#[instrument(skip(store), err(Display))]
pub async fn featured_products(store: &dyn RemoteStore) -> Result<Vec<Product>> {
  let rows = store
    .select(Table::Products, &Select::all(), &[Filter::eq("featured", true)])
    .await?;
  Ok(decode_rows(rows)?)
}

#[instrument(skip(store), err(Display))]
pub async fn categories(store: &dyn RemoteStore) -> Result<Vec<Category>> {
  let rows = store
    .select(Table::Categories, &Select::all().order_by("display_order"), &[])
    .await?;
  Ok(decode_rows(rows)?)
}

#[instrument(skip(store), err(Display))]
pub async fn product_by_slug(store: &dyn RemoteStore, slug: &str) -> Result<Product> {
  let rows = store
    .select(Table::Products, &Select::all(), &[Filter::eq("slug", slug)])
    .await?;
  decode_rows::<Product>(rows)?
    .into_iter()
    .next()
    .ok_or_else(|| AppError::NotFound("Product Not Found".to_string()))
}

#[instrument(skip(store), err(Display))]
pub async fn reviews_for(store: &dyn RemoteStore, product_id: Uuid) -> Result<Vec<Review>> {
  let rows = store
    .select(Table::Reviews, &Select::all(), &[Filter::eq("product_id", product_id)])
    .await?;
  Ok(decode_rows(rows)?)
}

#[instrument(skip(store), err(Display))]
pub async fn profile_of(store: &dyn RemoteStore, user_id: Uuid) -> Result<Option<Profile>> {
  let rows = store
    .select(Table::Profiles, &Select::all(), &[Filter::eq("id", user_id)])
    .await?;
  Ok(decode_rows::<Profile>(rows)?.into_iter().next())
}
