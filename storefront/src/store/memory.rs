// storefront/src/store/memory.rs

//! In-process `RemoteStore` with the hosted store's observable behavior:
//! generated ids, unique keys enforced on insert and used by upsert, embedded
//! relations, plus per-table failure injection and a log of writes.

use super::{Filter, RemoteStore, Row, Select, StoreError, Table};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
  Insert,
  Update,
  Upsert,
  Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOp {
  pub kind: WriteKind,
  pub table: Table,
}

#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<HashMap<Table, Vec<Row>>>,
  unique_keys: RwLock<HashMap<Table, Vec<Vec<String>>>>,
  failures: RwLock<HashMap<Table, String>>,
  writes: RwLock<Vec<WriteOp>>,
}

fn text_of(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Null => "null".to_string(),
    other => other.to_string(),
  }
}

fn matches(row: &Row, filters: &[Filter]) -> bool {
  filters
    .iter()
    .all(|f| row.get(&f.column).map(text_of).as_deref() == Some(f.value.as_str()))
}

fn project(row: &Row, columns: &[String]) -> Row {
  if columns.is_empty() {
    return row.clone();
  }
  let mut out = Map::new();
  for column in columns {
    out.insert(column.clone(), row.get(column).cloned().unwrap_or(Value::Null));
  }
  Value::Object(out)
}

fn same_key(a: &Row, b: &Row, key: &[String]) -> bool {
  key.iter().all(|column| match (a.get(column), b.get(column)) {
    (Some(x), Some(y)) => text_of(x) == text_of(y),
    _ => false,
  })
}

fn merge_into(target: &mut Row, changes: &Row) {
  if let (Some(target), Some(changes)) = (target.as_object_mut(), changes.as_object()) {
    for (column, value) in changes {
      target.insert(column.clone(), value.clone());
    }
  }
}

impl MemoryStore {
  /// A store with the unique keys of the storefront schema.
  pub fn new() -> Self {
    let store = Self::default();
    store.add_unique_key(Table::Products, &["slug"]);
    store.add_unique_key(Table::Products, &["sku"]);
    store.add_unique_key(Table::Categories, &["slug"]);
    store.add_unique_key(Table::CartItems, &["user_id", "product_id"]);
    store.add_unique_key(Table::Wishlists, &["user_id", "product_id"]);
    store
  }

  pub fn add_unique_key(&self, table: Table, columns: &[&str]) {
    self
      .unique_keys
      .write()
      .entry(table)
      .or_default()
      .push(columns.iter().map(|c| c.to_string()).collect());
  }

  /// Puts rows in place as-is. Seeding is not recorded as a write.
  pub fn seed(&self, table: Table, rows: impl IntoIterator<Item = Row>) {
    self.tables.write().entry(table).or_default().extend(rows);
  }

  pub fn rows(&self, table: Table) -> Vec<Row> {
    self.tables.read().get(&table).cloned().unwrap_or_default()
  }

  /// Every later call touching `table` fails with `message`.
  pub fn fail_table(&self, table: Table, message: &str) {
    self.failures.write().insert(table, message.to_string());
  }

  pub fn writes(&self) -> Vec<WriteOp> {
    self.writes.read().clone()
  }

  pub fn clear_writes(&self) {
    self.writes.write().clear();
  }

  fn check_available(&self, table: Table) -> Result<(), StoreError> {
    match self.failures.read().get(&table) {
      Some(message) => Err(StoreError::Unavailable {
        table,
        message: message.clone(),
      }),
      None => Ok(()),
    }
  }

  fn record(&self, kind: WriteKind, table: Table) {
    self.writes.write().push(WriteOp { kind, table });
  }

  fn keys_of(&self, table: Table) -> Vec<Vec<String>> {
    self.unique_keys.read().get(&table).cloned().unwrap_or_default()
  }

  fn with_generated_columns(mut row: Row) -> Row {
    if let Some(obj) = row.as_object_mut() {
      obj
        .entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
      let now = Value::String(chrono::Utc::now().to_rfc3339());
      obj.entry("created_at").or_insert_with(|| now.clone());
      obj.entry("updated_at").or_insert(now);
    }
    row
  }

  fn embed_related(&self, tables: &HashMap<Table, Vec<Row>>, row: &Row, select: &Select) -> Row {
    let mut out = project(row, &select.columns);
    for embed in &select.embeds {
      let related = row.get(&embed.foreign_key).and_then(|fk| {
        let fk = text_of(fk);
        tables
          .get(&embed.table)
          .and_then(|rows| rows.iter().find(|r| r.get("id").map(text_of).as_deref() == Some(fk.as_str())))
      });
      let value = related.map(|r| project(r, &embed.columns)).unwrap_or(Value::Null);
      if let Some(obj) = out.as_object_mut() {
        obj.insert(embed.alias.clone(), value);
      }
    }
    out
  }
}

#[async_trait]
impl RemoteStore for MemoryStore {
  #[instrument(name = "MemoryStore::select", skip_all, fields(%table))]
  async fn select(&self, table: Table, select: &Select, filters: &[Filter]) -> Result<Vec<Row>, StoreError> {
    self.check_available(table)?;
    let tables = self.tables.read();
    let mut matched: Vec<&Row> = tables
      .get(&table)
      .map(|rows| rows.iter().filter(|r| matches(r, filters)).collect())
      .unwrap_or_default();
    if let Some(column) = &select.order_by {
      matched.sort_by(|a, b| match (a.get(column), b.get(column)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
          .as_f64()
          .partial_cmp(&y.as_f64())
          .unwrap_or(std::cmp::Ordering::Equal),
        (x, y) => x.map(text_of).cmp(&y.map(text_of)),
      });
    }
    let rows: Vec<Row> = matched.into_iter().map(|r| self.embed_related(&tables, r, select)).collect();
    debug!(rows = rows.len(), "Rows fetched.");
    Ok(rows)
  }

  #[instrument(name = "MemoryStore::insert", skip_all, fields(%table))]
  async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
    self.check_available(table)?;
    let row = Self::with_generated_columns(row);
    let keys = self.keys_of(table);
    let mut tables = self.tables.write();
    let rows = tables.entry(table).or_default();
    if let Some(key) = keys.iter().find(|key| rows.iter().any(|r| same_key(r, &row, key))) {
      return Err(StoreError::Api {
        table,
        status: 409,
        body: format!("duplicate key value violates unique constraint ({})", key.join(",")),
      });
    }
    rows.push(row.clone());
    drop(tables);
    self.record(WriteKind::Insert, table);
    Ok(row)
  }

  #[instrument(name = "MemoryStore::update", skip_all, fields(%table))]
  async fn update(&self, table: Table, changes: Row, filters: &[Filter]) -> Result<(), StoreError> {
    self.check_available(table)?;
    {
      let mut tables = self.tables.write();
      if let Some(rows) = tables.get_mut(&table) {
        for row in rows.iter_mut().filter(|r| matches(r, filters)) {
          merge_into(row, &changes);
        }
      }
    }
    self.record(WriteKind::Update, table);
    Ok(())
  }

  #[instrument(name = "MemoryStore::upsert", skip_all, fields(%table, ?on_conflict))]
  async fn upsert(&self, table: Table, row: Row, on_conflict: &[&str]) -> Result<(), StoreError> {
    self.check_available(table)?;
    let key: Vec<String> = on_conflict.iter().map(|c| c.to_string()).collect();
    {
      let mut tables = self.tables.write();
      let rows = tables.entry(table).or_default();
      match rows.iter_mut().find(|r| same_key(r, &row, &key)) {
        Some(existing) => merge_into(existing, &row),
        None => rows.push(Self::with_generated_columns(row)),
      }
    }
    self.record(WriteKind::Upsert, table);
    Ok(())
  }

  #[instrument(name = "MemoryStore::delete", skip_all, fields(%table))]
  async fn delete(&self, table: Table, filters: &[Filter]) -> Result<(), StoreError> {
    self.check_available(table)?;
    {
      let mut tables = self.tables.write();
      if let Some(rows) = tables.get_mut(&table) {
        rows.retain(|r| !matches(r, filters));
      }
    }
    self.record(WriteKind::Delete, table);
    Ok(())
  }

  fn scoped(self: Arc<Self>, _access_token: Option<&str>) -> Arc<dyn RemoteStore> {
    self
  }
}
