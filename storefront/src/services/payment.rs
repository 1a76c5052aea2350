// storefront/src/services/payment.rs

//! Handle on the payment gateway's hosted checkout.
//!
//! Checkout opens a [`PaymentSession`] for a gateway order and awaits its
//! [`PaymentOutcome`]. With [`BrowserCheckout`] the session is completed by
//! the visitor's browser: the page loads the gateway script with the returned
//! options and posts the success response back, which resolves the session.
//! The gateway reports successes only; a session closed any other way ends as
//! `Dismissed`.

use crate::errors::{AppError, Result};

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, OnceCell};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Prefill {
  pub name: String,
  pub email: String,
  pub contact: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Theme {
  pub color: String,
}

/// Constructor options of the gateway's checkout widget.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaymentOptions {
  pub key: String,
  pub amount: i64,
  pub currency: String,
  pub name: String,
  pub description: String,
  pub order_id: String,
  pub prefill: Prefill,
  pub theme: Theme,
}

/// Everything the page needs to open the payment widget.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaymentLaunch {
  pub script_url: String,
  pub options: PaymentOptions,
}

/// Body of the gateway's success callback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentResponse {
  pub razorpay_payment_id: String,
  pub razorpay_order_id: Option<String>,
  pub razorpay_signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
  Paid(PaymentResponse),
  Dismissed,
}

type CloseHook = Box<dyn FnOnce() + Send + Sync>;

/// An open payment widget for one gateway order. Dropping it closes it.
pub struct PaymentSession {
  gateway_order_id: String,
  receiver: oneshot::Receiver<PaymentResponse>,
  on_close: Option<CloseHook>,
}

impl std::fmt::Debug for PaymentSession {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PaymentSession")
      .field("gateway_order_id", &self.gateway_order_id)
      .finish()
  }
}

impl PaymentSession {
  pub fn new(gateway_order_id: impl Into<String>, receiver: oneshot::Receiver<PaymentResponse>) -> Self {
    Self {
      gateway_order_id: gateway_order_id.into(),
      receiver,
      on_close: None,
    }
  }

  /// Runs `hook` once when the session is dropped.
  pub fn on_close(mut self, hook: impl FnOnce() + Send + Sync + 'static) -> Self {
    self.on_close = Some(Box::new(hook));
    self
  }

  pub fn gateway_order_id(&self) -> &str {
    &self.gateway_order_id
  }

  /// Waits for the success callback. Resolves to `Dismissed` once the
  /// gateway drops its end of the session.
  pub async fn outcome(mut self) -> PaymentOutcome {
    match (&mut self.receiver).await {
      Ok(response) => PaymentOutcome::Paid(response),
      Err(_) => PaymentOutcome::Dismissed,
    }
  }
}

impl Drop for PaymentSession {
  fn drop(&mut self) {
    if let Some(hook) = self.on_close.take() {
      hook();
    }
  }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  async fn open_payment_session(&self, options: &PaymentOptions) -> Result<PaymentSession>;

  /// Delivers a success callback to the session open for `gateway_order_id`.
  fn complete(&self, gateway_order_id: &str, response: PaymentResponse) -> Result<()>;

  /// Closes the session open for `gateway_order_id`, if any, without payment.
  fn dismiss(&self, gateway_order_id: &str) -> bool;
}

type PendingSessions = Arc<Mutex<HashMap<String, (u64, oneshot::Sender<PaymentResponse>)>>>;

/// Gateway sessions completed through the visitor's browser.
#[derive(Default)]
pub struct BrowserCheckout {
  pending: PendingSessions,
  next_session: AtomicU64,
}

impl BrowserCheckout {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn open_sessions(&self) -> usize {
    self.pending.lock().len()
  }
}

#[async_trait]
impl PaymentGateway for BrowserCheckout {
  #[instrument(name = "BrowserCheckout::open", skip_all, fields(gateway_order_id = %options.order_id))]
  async fn open_payment_session(&self, options: &PaymentOptions) -> Result<PaymentSession> {
    let (tx, rx) = oneshot::channel();
    let seq = self.next_session.fetch_add(1, Ordering::Relaxed);
    let order_id = options.order_id.clone();
    if self.pending.lock().insert(order_id.clone(), (seq, tx)).is_some() {
      warn!("Replaced a payment session that was still open for this order.");
    }
    debug!(seq, "Payment session opened.");

    let pending = Arc::clone(&self.pending);
    let close_id = order_id.clone();
    Ok(PaymentSession::new(order_id, rx).on_close(move || {
      let mut pending = pending.lock();
      if pending.get(&close_id).map(|(s, _)| *s) == Some(seq) {
        pending.remove(&close_id);
      }
    }))
  }

  #[instrument(name = "BrowserCheckout::complete", skip(self, response), err(Display))]
  fn complete(&self, gateway_order_id: &str, response: PaymentResponse) -> Result<()> {
    let entry = self.pending.lock().remove(gateway_order_id);
    let not_open = || AppError::NotFound(format!("No payment session is open for order {}", gateway_order_id));
    let (_, tx) = entry.ok_or_else(not_open)?;
    tx.send(response).map_err(|_| not_open())?;
    info!("Payment callback delivered.");
    Ok(())
  }

  fn dismiss(&self, gateway_order_id: &str) -> bool {
    let dismissed = self.pending.lock().remove(gateway_order_id).is_some();
    if dismissed {
      info!(gateway_order_id, "Payment session dismissed.");
    }
    dismissed
  }
}

type GatewayLoader = Box<dyn Fn() -> BoxFuture<'static, Result<Arc<dyn PaymentGateway>>> + Send + Sync>;

/// A gateway built on first use and shared afterwards.
pub struct LazyPaymentGateway {
  cell: OnceCell<Arc<dyn PaymentGateway>>,
  loader: GatewayLoader,
}

impl LazyPaymentGateway {
  pub fn new<F, Fut>(loader: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<dyn PaymentGateway>>> + Send + 'static,
  {
    Self {
      cell: OnceCell::new(),
      loader: Box::new(move || Box::pin(loader())),
    }
  }

  /// Already loaded with `gateway`.
  pub fn ready(gateway: Arc<dyn PaymentGateway>) -> Self {
    Self {
      cell: OnceCell::new_with(Some(gateway)),
      loader: Box::new(|| Box::pin(async { Err(AppError::Internal("payment gateway reloaded".to_string())) })),
    }
  }

  pub async fn get(&self) -> Result<Arc<dyn PaymentGateway>> {
    let gateway = self
      .cell
      .get_or_try_init(|| async {
        info!("Loading payment gateway.");
        (self.loader)().await
      })
      .await?;
    Ok(Arc::clone(gateway))
  }

  /// The gateway, if something already loaded it.
  pub fn loaded(&self) -> Option<Arc<dyn PaymentGateway>> {
    self.cell.get().cloned()
  }
}
