// storefront/src/pipelines/checkout_pipeline.rs

use crate::errors::AppError;
use crate::models::{NewOrder, NewOrderItem, Order, PaymentConfirmation};
use crate::pipelines::contexts::CheckoutCtx;
use crate::services::functions::{minor_units, CustomerInfo, PaymentOrderRequest};
use crate::services::notify::messages;
use crate::services::payment::{PaymentLaunch, PaymentOptions, PaymentOutcome, Prefill, Theme};
use crate::store::{decode_row, to_row, Filter, Table};

use kidova_pipeline::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{debug, error, info, warn};

pub const CHECKOUT_STEPS: [&str; 5] = [
  "guard_checkout",
  "create_pending_order",
  "create_gateway_order",
  "open_payment_session",
  "confirm_order",
];

pub const PAYMENT_DESCRIPTION: &str = "Order Payment";

pub fn register_checkout_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<CheckoutCtx, AppError>::new(&[
    (CHECKOUT_STEPS[0], false, None),
    (CHECKOUT_STEPS[1], false, None),
    (CHECKOUT_STEPS[2], false, None),
    (CHECKOUT_STEPS[3], false, None),
    (CHECKOUT_STEPS[4], false, None),
  ]);

  // Step 1: signed in, something in the cart, shipping form complete.
  p.on_root("guard_checkout", |ctx_data: ContextData<CheckoutCtx>| {
    Box::pin(async move {
      let cart = ctx_data.read().services.cart.clone();
      let user = cart.session().current().ok_or_else(|| {
        warn!("Checkout refused: no session.");
        AppError::SignInRequired
      })?;
      if cart.is_loading() {
        cart.refresh().await;
      }
      if cart.snapshot().items.is_empty() {
        warn!(user_id = %user.id, "Checkout refused: cart is empty.");
        return Err(AppError::EmptyCart);
      }
      let mut guard = ctx_data.write();
      guard.shipping.validate()?;
      guard.user = Some(user);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 2: pending order carrying the shipping form and the cart total.
  p.on_root("create_pending_order", |ctx_data: ContextData<CheckoutCtx>| {
    Box::pin(async move {
      let (new_order, store) = {
        let guard = ctx_data.read();
        let user = guard.user.as_ref().ok_or(AppError::SignInRequired)?;
        let subtotal = guard.services.cart.total_price();
        (
          NewOrder::pending(user.id, subtotal, guard.shipping.clone()),
          guard.services.cart.store().clone(),
        )
      };

      let row = store.insert(Table::Orders, to_row(&new_order)?).await?;
      let order: Order = decode_row(row)?;
      info!(order_id = %order.id, total = %order.total_amount, "Pending order created.");
      ctx_data.write().order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 3: gateway order for the total in minor units. A failure here leaves
  // the pending order behind.
  p.on_root("create_gateway_order", |ctx_data: ContextData<CheckoutCtx>| {
    Box::pin(async move {
      let (request, access_token, functions) = {
        let guard = ctx_data.read();
        let order = guard
          .order
          .as_ref()
          .ok_or_else(|| AppError::Internal("checkout has no order".to_string()))?;
        let user = guard.user.as_ref().ok_or(AppError::SignInRequired)?;
        let request = PaymentOrderRequest {
          amount: minor_units(order.total_amount)?,
          currency: guard.services.config.currency.clone(),
          order_id: order.id,
          customer_info: CustomerInfo {
            name: guard.shipping.full_name.clone(),
            email: guard.shipping.email.clone(),
            phone: guard.shipping.phone.clone(),
          },
        };
        (request, user.access_token.clone(), guard.services.functions.clone())
      };

      let gateway_order = functions.create_payment_order(&access_token, &request).await?;
      debug!(razorpay_order_id = %gateway_order.razorpay_order_id, "Gateway order attached.");
      ctx_data.write().gateway_order = Some(gateway_order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 4: load the gateway, open the widget and hand its options over.
  p.on_root("open_payment_session", |ctx_data: ContextData<CheckoutCtx>| {
    Box::pin(async move {
      let (launch, payments) = {
        let guard = ctx_data.read();
        let gateway_order = guard
          .gateway_order
          .as_ref()
          .ok_or_else(|| AppError::Internal("checkout has no gateway order".to_string()))?;
        let config = &guard.services.config;
        let options = PaymentOptions {
          key: gateway_order.razorpay_key_id.clone(),
          amount: gateway_order.amount,
          currency: gateway_order.currency.clone(),
          name: config.brand_name.clone(),
          description: PAYMENT_DESCRIPTION.to_string(),
          order_id: gateway_order.razorpay_order_id.clone(),
          prefill: Prefill {
            name: guard.shipping.full_name.clone(),
            email: guard.shipping.email.clone(),
            contact: guard.shipping.phone.clone(),
          },
          theme: Theme {
            color: config.theme_color.clone(),
          },
        };
        let launch = PaymentLaunch {
          script_url: config.payment_script_url.clone(),
          options,
        };
        (launch, guard.services.payments.clone())
      };

      let gateway = payments.get().await?;
      let session = gateway.open_payment_session(&launch.options).await?;

      let launch_tx = {
        let mut guard = ctx_data.write();
        guard.payment_session = Some(session);
        guard.launch_tx.take()
      };
      match launch_tx.map(|tx| tx.send(launch)) {
        Some(Ok(())) => Ok::<_, AppError>(PipelineControl::Continue),
        _ => {
          warn!("Nobody is waiting to show the payment widget; closing the session.");
          ctx_data.write().payment_session = None;
          Ok(PipelineControl::Stop)
        }
      }
    })
  });

  // Step 5: wait for the gateway. On success confirm the order and record its
  // items at the prices in the cart right now, then empty the cart.
  p.on_root("confirm_order", |ctx_data: ContextData<CheckoutCtx>| {
    Box::pin(async move {
      let session = ctx_data
        .write()
        .payment_session
        .take()
        .ok_or_else(|| AppError::Internal("checkout has no payment session".to_string()))?;

      let response = match session.outcome().await {
        PaymentOutcome::Paid(response) => response,
        PaymentOutcome::Dismissed => {
          info!("Payment session closed without payment; order stays pending.");
          return Ok(PipelineControl::Stop);
        }
      };

      let (order_id, cart) = {
        let guard = ctx_data.read();
        let order_id = guard
          .order
          .as_ref()
          .map(|o| o.id)
          .ok_or_else(|| AppError::Internal("checkout has no order".to_string()))?;
        (order_id, guard.services.cart.clone())
      };
      let store = cart.store().clone();

      let confirmation = PaymentConfirmation::paid(response.razorpay_payment_id.clone());
      store
        .update(Table::Orders, to_row(&confirmation)?, &[Filter::eq("id", order_id)])
        .await
        .map_err(|e| {
          error!(%order_id, error = %e, "Paid order could not be confirmed.");
          AppError::from(e)
        })?;

      let items = cart.snapshot().items;
      for item in &items {
        let row = to_row(&NewOrderItem::from_cart_item(order_id, item))?;
        store.insert(Table::OrderItems, row).await?;
      }

      if let Err(e) = cart.clear().await {
        debug!(error = %e, "Cart not cleared after order.");
      }
      cart.notifier().success(messages::ORDER_PLACED);
      info!(%order_id, items = items.len(), "Order placed.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
  info!("Checkout pipeline registered.");
}
