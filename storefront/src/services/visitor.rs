// storefront/src/services/visitor.rs

//! One visitor of the storefront: their session, cart, pending notices and
//! the checkout currently waiting on the payment gateway.

use crate::errors::{AppError, Result};
use crate::models::ShippingDetails;
use crate::pipelines::contexts::{CheckoutCtx, CheckoutServices};
use crate::services::cart::CartStore;
use crate::services::notify::{messages, Notice, NoticeQueue, Notifier};
use crate::services::payment::{PaymentLaunch, PaymentResponse};
use crate::services::session::{AuthUser, SessionStore};
use crate::state::Backend;
use crate::store::RemoteStore;

use kidova_pipeline::{ContextData, PipelineResult};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, instrument, warn, Instrument};

struct PendingCheckout {
  gateway_order_id: String,
  task: JoinHandle<Result<PipelineResult>>,
}

pub struct Visitor {
  backend: Backend,
  store: Arc<dyn RemoteStore>,
  session: SessionStore,
  notices: Arc<NoticeQueue>,
  cart: CartStore,
  pending: Mutex<Option<PendingCheckout>>,
  sync_task: Option<JoinHandle<()>>,
}

impl Visitor {
  /// A visitor acting as `user`, or an anonymous one. A signed-in visitor's
  /// cart starts loading right away and follows the session from then on.
  pub fn open(backend: &Backend, user: Option<AuthUser>) -> Arc<Self> {
    let token = user.as_ref().map(|u| u.access_token.clone());
    let store = Arc::clone(&backend.store).scoped(token.as_deref());
    let session = match user {
      Some(user) => SessionStore::signed_in(user),
      None => SessionStore::new(),
    };
    let notices = Arc::new(NoticeQueue::default());
    let cart = CartStore::new(
      Arc::clone(&store),
      session.clone(),
      notices.clone(),
      Arc::clone(&backend.workflows),
    );

    let sync_task = if session.is_signed_in() {
      Some(cart.sync_with_session())
    } else {
      cart.reset();
      None
    };

    Arc::new(Self {
      backend: backend.clone(),
      store,
      session,
      notices,
      cart,
      pending: Mutex::new(None),
      sync_task,
    })
  }

  pub fn user(&self) -> Option<AuthUser> {
    self.session.current()
  }

  pub fn session(&self) -> &SessionStore {
    &self.session
  }

  pub fn cart(&self) -> &CartStore {
    &self.cart
  }

  pub fn store(&self) -> &Arc<dyn RemoteStore> {
    &self.store
  }

  pub fn drain_notices(&self) -> Vec<Notice> {
    self.notices.drain()
  }

  pub fn has_pending_payment(&self) -> bool {
    self.pending.lock().is_some()
  }

  /// Runs checkout up to the open payment widget and returns its launch
  /// options. The rest of the workflow waits in the background for the
  /// gateway's callback. Starting another checkout closes the earlier widget.
  #[instrument(name = "Visitor::begin_checkout", skip_all)]
  pub async fn begin_checkout(&self, shipping: ShippingDetails) -> Result<PaymentLaunch> {
    self.dismiss_pending_payment();

    let (launch_tx, launch_rx) = oneshot::channel();
    let services = CheckoutServices {
      cart: self.cart.clone(),
      functions: Arc::clone(&self.backend.functions),
      payments: Arc::clone(&self.backend.payments),
      config: Arc::clone(&self.backend.config),
    };
    let ctx = ContextData::new(CheckoutCtx::new(services, shipping, launch_tx));
    let workflows = Arc::clone(&self.backend.workflows);
    let notifier: Arc<dyn Notifier> = self.notices.clone();

    let task = tokio::spawn(
      async move {
        let result = workflows.run(ctx).await;
        if let Err(e) = &result {
          if !e.is_guard_violation() {
            error!(error = %e, "Checkout error.");
            notifier.error(messages::CHECKOUT_FAILED);
          }
        }
        result
      }
      .instrument(info_span!("checkout")),
    );

    match launch_rx.await {
      Ok(launch) => {
        // Overlapping checkouts race to this point; the last one keeps the slot.
        let superseded = self.pending.lock().replace(PendingCheckout {
          gateway_order_id: launch.options.order_id.clone(),
          task,
        });
        if let Some(previous) = superseded {
          self.close_checkout(previous);
        }
        Ok(launch)
      }
      // The workflow ended before a widget opened.
      Err(_) => match task.await {
        Ok(Ok(_)) => Err(AppError::Payment("Checkout ended before payment could start".to_string())),
        Ok(Err(e)) => Err(e),
        Err(join_err) => Err(AppError::Internal(format!("Checkout task failed: {}", join_err))),
      },
    }
  }

  /// Delivers the gateway's success callback and waits for the order to be
  /// confirmed.
  #[instrument(name = "Visitor::complete_payment", skip_all, fields(payment_id = %response.razorpay_payment_id))]
  pub async fn complete_payment(&self, response: PaymentResponse) -> Result<()> {
    let pending = self
      .pending
      .lock()
      .take()
      .ok_or_else(|| AppError::NotFound("No checkout is awaiting payment".to_string()))?;

    if let Some(order_id) = &response.razorpay_order_id {
      if order_id != &pending.gateway_order_id {
        warn!(%order_id, expected = %pending.gateway_order_id, "Payment callback for another order.");
        *self.pending.lock() = Some(pending);
        return Err(AppError::NotFound(format!("No checkout is awaiting payment for order {}", order_id)));
      }
    }

    let gateway = self.backend.payments.get().await?;
    gateway.complete(&pending.gateway_order_id, response)?;

    match pending.task.await {
      Ok(Ok(PipelineResult::Completed)) => Ok(()),
      Ok(Ok(PipelineResult::Stopped)) => Err(AppError::Payment("Payment session closed before confirmation".to_string())),
      Ok(Err(e)) => Err(e),
      Err(join_err) => Err(AppError::Internal(format!("Checkout task failed: {}", join_err))),
    }
  }

  /// Closes the payment widget of the pending checkout, if any. Its order
  /// stays pending.
  pub fn dismiss_pending_payment(&self) -> bool {
    let Some(pending) = self.pending.lock().take() else {
      return false;
    };
    self.close_checkout(pending);
    true
  }

  /// Closes the widget of `pending`; its workflow then stops on its own.
  fn close_checkout(&self, pending: PendingCheckout) {
    if let Some(gateway) = self.backend.payments.loaded() {
      gateway.dismiss(&pending.gateway_order_id);
    }
    info!(gateway_order_id = %pending.gateway_order_id, "Pending checkout abandoned.");
  }

  #[instrument(name = "Visitor::sign_out", skip_all)]
  pub async fn sign_out(&self) -> Result<()> {
    self.dismiss_pending_payment();
    let Some(user) = self.session.current() else {
      return Ok(());
    };
    self.session.sign_out();
    self.backend.auth.sign_out(&user.access_token).await
  }
}

impl Drop for Visitor {
  fn drop(&mut self) {
    self.dismiss_pending_payment();
    if let Some(task) = self.sync_task.take() {
      task.abort();
    }
  }
}
