// storefront/src/services/cart.rs

//! The visitor's cart: a cache of their `cart_items` rows joined with product
//! display fields.
//!
//! Every mutation goes to the data store first and is followed by a full
//! refetch. `clear` is the one exception and empties the local copy directly.

use crate::errors::{AppError, Result};
use crate::models::{CartItem, NewCartLine};
use crate::pipelines::contexts::AddToCartCtx;
use crate::services::notify::{messages, Notifier};
use crate::services::session::SessionStore;
use crate::store::{decode_rows, to_row, Filter, RemoteStore, Table};

use kidova_pipeline::{ContextData, Registry};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct CartState {
  pub items: Vec<CartItem>,
  /// True until the first fetch settles.
  pub loading: bool,
}

impl Default for CartState {
  fn default() -> Self {
    Self {
      items: Vec::new(),
      loading: true,
    }
  }
}

impl CartState {
  pub fn total_items(&self) -> i64 {
    self.items.iter().map(|item| i64::from(item.quantity)).sum()
  }

  pub fn total_price(&self) -> Decimal {
    self.items.iter().map(CartItem::line_total).sum()
  }
}

#[derive(Clone)]
pub struct CartStore {
  store: Arc<dyn RemoteStore>,
  session: SessionStore,
  notifier: Arc<dyn Notifier>,
  workflows: Arc<Registry<AppError>>,
  state: ContextData<CartState>,
}

impl CartStore {
  pub fn new(
    store: Arc<dyn RemoteStore>,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
    workflows: Arc<Registry<AppError>>,
  ) -> Self {
    Self {
      store,
      session,
      notifier,
      workflows,
      state: ContextData::default(),
    }
  }

  pub fn store(&self) -> &Arc<dyn RemoteStore> {
    &self.store
  }

  pub fn session(&self) -> &SessionStore {
    &self.session
  }

  pub fn notifier(&self) -> &Arc<dyn Notifier> {
    &self.notifier
  }

  pub fn snapshot(&self) -> CartState {
    self.state.snapshot()
  }

  pub fn is_loading(&self) -> bool {
    self.state.read().loading
  }

  /// Sum of quantities over the current lines.
  pub fn total_items(&self) -> i64 {
    self.state.read().total_items()
  }

  /// Sum of effective unit price times quantity over the current lines.
  pub fn total_price(&self) -> Decimal {
    self.state.read().total_price()
  }

  /// Empty and settled. What a visitor without a session sees.
  pub fn reset(&self) {
    self.state.update(|s| {
      s.items.clear();
      s.loading = false;
    });
  }

  /// Replaces the local lines with the signed-in user's rows. On failure the
  /// previous lines stay in place.
  #[instrument(name = "CartStore::fetch", skip(self))]
  pub async fn fetch(&self) -> Result<()> {
    let Some(user) = self.session.current() else {
      self.reset();
      return Ok(());
    };

    let fetched = self
      .store
      .select(Table::CartItems, &CartItem::selection(), &[Filter::eq("user_id", user.id)])
      .await
      .and_then(decode_rows::<CartItem>);

    match fetched {
      Ok(items) => {
        debug!(lines = items.len(), "Cart fetched.");
        self.state.update(|s| {
          s.items = items;
          s.loading = false;
        });
        Ok(())
      }
      Err(e) => {
        error!(error = %e, "Error fetching cart.");
        self.notifier.error(messages::CART_LOAD_FAILED);
        self.state.update(|s| s.loading = false);
        Err(e.into())
      }
    }
  }

  /// Sets the quantity of `product_id` in the cart, creating the line if
  /// needed. An existing line's quantity is replaced, not increased.
  #[instrument(name = "CartStore::add", skip(self))]
  pub async fn add(&self, product_id: Uuid, quantity: i32) -> Result<()> {
    let ctx = ContextData::new(AddToCartCtx {
      cart: self.clone(),
      user: self.session.current(),
      product_id,
      quantity,
    });
    self.workflows.run(ctx).await?;
    Ok(())
  }

  /// Writes the `(user, product)` line. Used by the add-to-cart workflow.
  pub(crate) async fn upsert_line(&self, line: &NewCartLine) -> Result<()> {
    let row = to_row(line)?;
    self
      .store
      .upsert(Table::CartItems, row, &NewCartLine::CONFLICT_KEY)
      .await?;
    Ok(())
  }

  #[instrument(name = "CartStore::remove", skip(self))]
  pub async fn remove(&self, item_id: Uuid) -> Result<()> {
    match self.store.delete(Table::CartItems, &[Filter::eq("id", item_id)]).await {
      Ok(()) => {
        self.notifier.success(messages::REMOVED_FROM_CART);
        self.refresh().await;
        Ok(())
      }
      Err(e) => {
        error!(error = %e, "Error removing from cart.");
        self.notifier.error(messages::REMOVE_FAILED);
        Err(e.into())
      }
    }
  }

  /// Quantities below one are ignored without touching the data store.
  #[instrument(name = "CartStore::update_quantity", skip(self))]
  pub async fn update_quantity(&self, item_id: Uuid, quantity: i32) -> Result<()> {
    if quantity < 1 {
      debug!("Ignoring quantity below one.");
      return Ok(());
    }
    let changes = json!({ "quantity": quantity });
    match self
      .store
      .update(Table::CartItems, changes, &[Filter::eq("id", item_id)])
      .await
    {
      Ok(()) => {
        self.refresh().await;
        Ok(())
      }
      Err(e) => {
        error!(error = %e, "Error updating quantity.");
        self.notifier.error(messages::UPDATE_FAILED);
        Err(e.into())
      }
    }
  }

  /// Deletes every line of the signed-in user and empties the local copy
  /// without refetching. Does nothing without a session.
  #[instrument(name = "CartStore::clear", skip(self))]
  pub async fn clear(&self) -> Result<()> {
    let Some(user) = self.session.current() else {
      return Ok(());
    };
    match self.store.delete(Table::CartItems, &[Filter::eq("user_id", user.id)]).await {
      Ok(()) => {
        self.state.update(|s| s.items.clear());
        info!("Cart cleared.");
        Ok(())
      }
      Err(e) => {
        error!(error = %e, "Error clearing cart.");
        self.notifier.error(messages::CLEAR_FAILED);
        Err(e.into())
      }
    }
  }

  /// Refetch after a successful write. A failed refetch has already been
  /// reported to the visitor and does not undo the write.
  pub(crate) async fn refresh(&self) {
    if let Err(e) = self.fetch().await {
      debug!(error = %e, "Refetch after write failed.");
    }
  }

  /// Refetches now and after every identity change of the session.
  pub fn sync_with_session(&self) -> JoinHandle<()> {
    let cart = self.clone();
    let mut identity = self.session.subscribe();
    tokio::spawn(async move {
      loop {
        let _ = identity.borrow_and_update();
        cart.refresh().await;
        if identity.changed().await.is_err() {
          break;
        }
      }
    })
  }
}
