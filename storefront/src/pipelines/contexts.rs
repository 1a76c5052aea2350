// storefront/src/pipelines/contexts.rs

//! Context data of the storefront's workflows. Handlers receive these wrapped
//! in `kidova_pipeline::ContextData`.

use crate::config::AppConfig;
use crate::models::{Order, ShippingDetails};
use crate::services::cart::CartStore;
use crate::services::functions::{FunctionGateway, GatewayOrder};
use crate::services::payment::{LazyPaymentGateway, PaymentLaunch, PaymentSession};
use crate::services::session::AuthUser;

use std::sync::Arc;
use tokio::sync::oneshot;
use uuid::Uuid;

pub struct AddToCartCtx {
  pub cart: CartStore,
  /// Identity at the time of the request; `None` means signed out.
  pub user: Option<AuthUser>,
  pub product_id: Uuid,
  pub quantity: i32,
}

/// Collaborators of one visitor's checkout.
#[derive(Clone)]
pub struct CheckoutServices {
  pub cart: CartStore,
  pub functions: Arc<dyn FunctionGateway>,
  pub payments: Arc<LazyPaymentGateway>,
  pub config: Arc<AppConfig>,
}

pub struct CheckoutCtx {
  pub services: CheckoutServices,
  pub shipping: ShippingDetails,

  pub user: Option<AuthUser>,
  pub order: Option<Order>,
  pub gateway_order: Option<GatewayOrder>,
  pub payment_session: Option<PaymentSession>,
  /// Hands the widget options to whoever started the checkout, once the
  /// payment session is open.
  pub launch_tx: Option<oneshot::Sender<PaymentLaunch>>,
}

impl CheckoutCtx {
  pub fn new(services: CheckoutServices, shipping: ShippingDetails, launch_tx: oneshot::Sender<PaymentLaunch>) -> Self {
    Self {
      services,
      shipping,
      user: None,
      order: None,
      gateway_order: None,
      payment_session: None,
      launch_tx: Some(launch_tx),
    }
  }
}
