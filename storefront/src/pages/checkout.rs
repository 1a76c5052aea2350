// storefront/src/pages/checkout.rs

use crate::errors::{AppError, Result};
use crate::models::ShippingDetails;
use crate::pages::cart::{CartLineView, OrderSummary};
use crate::services::catalog;
use crate::services::notify::Notice;
use crate::services::payment::PaymentLaunch;
use crate::services::visitor::Visitor;

use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutPage {
  /// Initial values of the shipping form.
  pub shipping: ShippingDetails,
  pub lines: Vec<CartLineView>,
  pub summary: OrderSummary,
  pub notices: Vec<Notice>,
}

impl CheckoutPage {
  /// Refused without a session, and with an empty cart.
  pub async fn build(visitor: &Visitor) -> Result<Self> {
    let user = visitor.user().ok_or(AppError::SignInRequired)?;
    if visitor.cart().is_loading() {
      visitor.cart().refresh().await;
    }
    let state = visitor.cart().snapshot();
    if state.items.is_empty() {
      return Err(AppError::EmptyCart);
    }

    let full_name = match catalog::profile_of(visitor.store().as_ref(), user.id).await {
      Ok(profile) => profile.and_then(|p| p.full_name).unwrap_or_default(),
      Err(e) => {
        debug!(error = %e, "Profile unavailable for form defaults.");
        String::new()
      }
    };

    Ok(Self {
      shipping: ShippingDetails {
        full_name,
        email: user.email.unwrap_or_default(),
        ..ShippingDetails::default()
      },
      lines: state.items.iter().map(CartLineView::from).collect(),
      summary: OrderSummary::of(&state),
      notices: visitor.drain_notices(),
    })
  }
}

/// Response to a submitted checkout: open the payment widget with `payment`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutStarted {
  pub payment: PaymentLaunch,
  pub notices: Vec<Notice>,
}
