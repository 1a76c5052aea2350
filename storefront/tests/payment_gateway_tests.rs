// tests/payment_gateway_tests.rs
mod common;

use common::*;
use kidova_storefront::errors::AppError;
use kidova_storefront::services::payment::{
  BrowserCheckout, LazyPaymentGateway, PaymentGateway, PaymentOptions, PaymentOutcome, PaymentResponse, Prefill, Theme,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn options(order_id: &str) -> PaymentOptions {
  PaymentOptions {
    key: "rzp_test_key".to_string(),
    amount: 399_800,
    currency: "INR".to_string(),
    name: "Kidova Labs".to_string(),
    description: "Order Payment".to_string(),
    order_id: order_id.to_string(),
    prefill: Prefill {
      name: "Alice Rao".to_string(),
      email: "alice@example.com".to_string(),
      contact: "9876543210".to_string(),
    },
    theme: Theme {
      color: "#FF6B35".to_string(),
    },
  }
}

fn response(order_id: &str) -> PaymentResponse {
  PaymentResponse {
    razorpay_payment_id: "pay_1".to_string(),
    razorpay_order_id: Some(order_id.to_string()),
    razorpay_signature: None,
  }
}

#[tokio::test]
async fn completed_session_resolves_paid() {
  setup_tracing();
  let gateway = BrowserCheckout::new();
  let session = gateway.open_payment_session(&options("order_A")).await.unwrap();
  assert_eq!(session.gateway_order_id(), "order_A");
  assert_eq!(gateway.open_sessions(), 1);

  gateway.complete("order_A", response("order_A")).unwrap();
  assert_eq!(session.outcome().await, PaymentOutcome::Paid(response("order_A")));
  assert_eq!(gateway.open_sessions(), 0);
}

#[tokio::test]
async fn dismissed_session_resolves_dismissed() {
  setup_tracing();
  let gateway = BrowserCheckout::new();
  let session = gateway.open_payment_session(&options("order_B")).await.unwrap();

  assert!(gateway.dismiss("order_B"));
  assert!(!gateway.dismiss("order_B"));
  assert_eq!(session.outcome().await, PaymentOutcome::Dismissed);

  let err = gateway.complete("order_B", response("order_B")).unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn dropping_a_session_unregisters_it() {
  setup_tracing();
  let gateway = BrowserCheckout::new();
  let session = gateway.open_payment_session(&options("order_C")).await.unwrap();
  drop(session);
  assert_eq!(gateway.open_sessions(), 0);
}

#[tokio::test]
async fn lazy_gateway_loads_once() {
  setup_tracing();
  let loads = Arc::new(AtomicUsize::new(0));
  let counter = loads.clone();
  let lazy = LazyPaymentGateway::new(move || {
    let counter = counter.clone();
    async move {
      counter.fetch_add(1, Ordering::SeqCst);
      Ok(Arc::new(BrowserCheckout::new()) as Arc<dyn PaymentGateway>)
    }
  });
  assert!(lazy.loaded().is_none());

  let first = lazy.get().await.unwrap();
  let second = lazy.get().await.unwrap();
  assert!(Arc::ptr_eq(&first, &second));
  assert_eq!(loads.load(Ordering::SeqCst), 1);
  assert!(lazy.loaded().is_some());
}
