// storefront/src/store/select.rs

use super::Table;

/// A related row pulled into each result row under `alias`, following
/// `foreign_key` on the parent table to the `id` of `table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
  pub alias: String,
  pub table: Table,
  pub foreign_key: String,
  pub columns: Vec<String>,
}

/// Columns to read. No columns means every column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Select {
  pub columns: Vec<String>,
  pub embeds: Vec<Embed>,
  pub order_by: Option<String>,
}

impl Select {
  pub fn all() -> Self {
    Self::default()
  }

  pub fn columns(columns: &[&str]) -> Self {
    Self {
      columns: columns.iter().map(|c| c.to_string()).collect(),
      ..Self::default()
    }
  }

  pub fn embed(mut self, alias: &str, table: Table, foreign_key: &str, columns: &[&str]) -> Self {
    self.embeds.push(Embed {
      alias: alias.to_string(),
      table,
      foreign_key: foreign_key.to_string(),
      columns: columns.iter().map(|c| c.to_string()).collect(),
    });
    self
  }

  /// Ascending order on `column`.
  pub fn order_by(mut self, column: &str) -> Self {
    self.order_by = Some(column.to_string());
    self
  }

  /// The REST `select` parameter, e.g. `id,quantity,product:products(name,slug)`.
  pub fn to_query(&self) -> String {
    let mut parts: Vec<String> = if self.columns.is_empty() {
      vec!["*".to_string()]
    } else {
      self.columns.clone()
    };
    for embed in &self.embeds {
      let inner = if embed.columns.is_empty() {
        "*".to_string()
      } else {
        embed.columns.join(",")
      };
      parts.push(format!("{}:{}({})", embed.alias, embed.table.name(), inner));
    }
    parts.join(",")
  }
}
