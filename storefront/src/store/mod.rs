// storefront/src/store/mod.rs

//! Table-level access to the hosted data store.
//!
//! Rows travel as `serde_json::Value` objects; models convert with
//! [`to_row`] and [`decode_rows`]. Two implementations exist: the REST client
//! used in production and an in-process store used by tests.

pub mod memory;
pub mod rest;
pub mod select;

pub use memory::MemoryStore;
pub use rest::PostgrestStore;
pub use select::{Embed, Select};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub type Row = serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
  Products,
  Categories,
  CartItems,
  Orders,
  OrderItems,
  Reviews,
  Wishlists,
  Profiles,
}

impl Table {
  pub fn name(&self) -> &'static str {
    match self {
      Table::Products => "products",
      Table::Categories => "categories",
      Table::CartItems => "cart_items",
      Table::Orders => "orders",
      Table::OrderItems => "order_items",
      Table::Reviews => "reviews",
      Table::Wishlists => "wishlists",
      Table::Profiles => "profiles",
    }
  }
}

impl fmt::Display for Table {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Column equality filter. Values are compared in their textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
  pub column: String,
  pub value: String,
}

impl Filter {
  pub fn eq(column: &str, value: impl ToString) -> Self {
    Self {
      column: column.to_string(),
      value: value.to_string(),
    }
  }
}

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("HTTP request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{table} request returned {status}: {body}")]
  Api { table: Table, status: u16, body: String },

  #[error("Row decoding failed: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("{table} is unavailable: {message}")]
  Unavailable { table: Table, message: String },
}

/// CRUD over the store's tables.
///
/// `update` and `delete` affect every row matching all `filters`. `upsert`
/// inserts `row`, or, when a row with the same `on_conflict` columns exists,
/// overwrites that row's remaining columns with the ones in `row`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
  async fn select(&self, table: Table, select: &Select, filters: &[Filter]) -> Result<Vec<Row>, StoreError>;

  /// Returns the row as stored, including generated columns.
  async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError>;

  async fn update(&self, table: Table, changes: Row, filters: &[Filter]) -> Result<(), StoreError>;

  async fn upsert(&self, table: Table, row: Row, on_conflict: &[&str]) -> Result<(), StoreError>;

  async fn delete(&self, table: Table, filters: &[Filter]) -> Result<(), StoreError>;

  /// A handle acting on behalf of `access_token`, or anonymously with `None`.
  fn scoped(self: Arc<Self>, access_token: Option<&str>) -> Arc<dyn RemoteStore>;
}

pub fn to_row<T: Serialize>(value: &T) -> Result<Row, StoreError> {
  Ok(serde_json::to_value(value)?)
}

pub fn decode_row<T: DeserializeOwned>(row: Row) -> Result<T, StoreError> {
  Ok(serde_json::from_value(row)?)
}

pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, StoreError> {
  rows.into_iter().map(decode_row).collect()
}
