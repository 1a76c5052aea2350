// storefront/src/store/rest.rs

use super::{Filter, RemoteStore, Row, Select, StoreError, Table};
use crate::config::AppConfig;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Builds the HTTP client shared by every backend call. No timeout unless one
/// is configured.
pub fn build_http_client(config: &AppConfig) -> Result<Client, reqwest::Error> {
  let mut builder = Client::builder();
  if let Some(secs) = config.http_timeout_secs {
    builder = builder.timeout(Duration::from_secs(secs));
  }
  builder.build()
}

/// `RemoteStore` over the hosted REST interface (`{project}/rest/v1/{table}`).
#[derive(Debug, Clone)]
pub struct PostgrestStore {
  client: Client,
  rest_url: String,
  api_key: String,
  access_token: Option<String>,
}

impl PostgrestStore {
  pub fn new(client: Client, config: &AppConfig) -> Self {
    Self {
      client,
      rest_url: config.rest_url(),
      api_key: config.supabase_anon_key.clone(),
      access_token: None,
    }
  }

  /// Requests without a visitor token authenticate with the project key itself.
  fn bearer(&self) -> String {
    format!("Bearer {}", self.access_token.as_deref().unwrap_or(&self.api_key))
  }

  fn request(&self, method: Method, table: Table, filters: &[Filter]) -> RequestBuilder {
    let url = format!("{}/{}", self.rest_url, table.name());
    let params: Vec<(String, String)> = filters
      .iter()
      .map(|f| (f.column.clone(), format!("eq.{}", f.value)))
      .collect();
    self
      .client
      .request(method, url)
      .header("apikey", &self.api_key)
      .header(header::AUTHORIZATION, self.bearer())
      .query(&params)
  }

  async fn check(table: Table, response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(%table, status = status.as_u16(), %body, "Data store rejected request.");
    Err(StoreError::Api {
      table,
      status: status.as_u16(),
      body,
    })
  }
}

#[async_trait]
impl RemoteStore for PostgrestStore {
  #[instrument(name = "PostgrestStore::select", skip_all, fields(%table))]
  async fn select(&self, table: Table, select: &Select, filters: &[Filter]) -> Result<Vec<Row>, StoreError> {
    let mut request = self
      .request(Method::GET, table, filters)
      .query(&[("select", select.to_query())]);
    if let Some(column) = &select.order_by {
      request = request.query(&[("order", format!("{}.asc", column))]);
    }
    let response = Self::check(table, request.send().await?).await?;
    let rows: Vec<Row> = response.json().await?;
    debug!(rows = rows.len(), "Rows fetched.");
    Ok(rows)
  }

  #[instrument(name = "PostgrestStore::insert", skip_all, fields(%table))]
  async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
    let request = self
      .request(Method::POST, table, &[])
      .header("Prefer", "return=representation")
      .json(&row);
    let response = Self::check(table, request.send().await?).await?;
    let status = response.status().as_u16();
    let mut rows: Vec<Row> = response.json().await?;
    if rows.is_empty() {
      return Err(StoreError::Api {
        table,
        status,
        body: "insert returned no representation".to_string(),
      });
    }
    Ok(rows.swap_remove(0))
  }

  #[instrument(name = "PostgrestStore::update", skip_all, fields(%table))]
  async fn update(&self, table: Table, changes: Row, filters: &[Filter]) -> Result<(), StoreError> {
    let request = self
      .request(Method::PATCH, table, filters)
      .header("Prefer", "return=minimal")
      .json(&changes);
    Self::check(table, request.send().await?).await?;
    Ok(())
  }

  #[instrument(name = "PostgrestStore::upsert", skip_all, fields(%table, ?on_conflict))]
  async fn upsert(&self, table: Table, row: Row, on_conflict: &[&str]) -> Result<(), StoreError> {
    let request = self
      .request(Method::POST, table, &[])
      .query(&[("on_conflict", on_conflict.join(","))])
      .header("Prefer", "resolution=merge-duplicates,return=minimal")
      .json(&row);
    Self::check(table, request.send().await?).await?;
    Ok(())
  }

  #[instrument(name = "PostgrestStore::delete", skip_all, fields(%table))]
  async fn delete(&self, table: Table, filters: &[Filter]) -> Result<(), StoreError> {
    let request = self.request(Method::DELETE, table, filters);
    Self::check(table, request.send().await?).await?;
    Ok(())
  }

  fn scoped(self: Arc<Self>, access_token: Option<&str>) -> Arc<dyn RemoteStore> {
    let mut store = (*self).clone();
    store.access_token = access_token.map(str::to_string);
    Arc::new(store)
  }
}
