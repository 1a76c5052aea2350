// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use kidova_storefront::config::AppConfig;
use kidova_storefront::errors::{AppError, Result};
use kidova_storefront::pipelines;
use kidova_storefront::services::auth::Authenticator;
use kidova_storefront::services::functions::{FunctionGateway, GatewayOrder, PaymentOrderRequest};
use kidova_storefront::services::payment::{BrowserCheckout, LazyPaymentGateway};
use kidova_storefront::services::session::AuthUser;
use kidova_storefront::state::Backend;
use kidova_storefront::store::{MemoryStore, RemoteStore, Row, Table};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub const PASSWORD: &str = "correct horse";

pub fn user(email: &str) -> AuthUser {
  AuthUser {
    id: Uuid::new_v4(),
    email: Some(email.to_string()),
    access_token: format!("token-{}", Uuid::new_v4()),
  }
}

pub fn product_row(id: Uuid, slug: &str, base_price: i64, sale_price: Option<i64>) -> Row {
  json!({
      "id": id.to_string(),
      "sku": format!("SKU-{}", slug.to_uppercase()),
      "slug": slug,
      "name": format!("Kit {}", slug),
      "base_price": base_price,
      "sale_price": sale_price,
      "in_stock": true,
      "featured": true,
      "primary_image_url": format!("https://cdn.example.com/{}.jpg", slug),
  })
}

pub fn cart_row(user_id: Uuid, product_id: Uuid, quantity: i32) -> Row {
  json!({
      "id": Uuid::new_v4().to_string(),
      "user_id": user_id.to_string(),
      "product_id": product_id.to_string(),
      "quantity": quantity,
  })
}

/// Two products: a robot kit on sale for 1999 (base 2499) and a circuit kit
/// at 1499.
pub struct Catalog {
  pub robot: Uuid,
  pub circuit: Uuid,
}

pub fn seed_catalog(store: &MemoryStore) -> Catalog {
  let catalog = Catalog {
    robot: Uuid::new_v4(),
    circuit: Uuid::new_v4(),
  };
  store.seed(
    Table::Products,
    vec![
      product_row(catalog.robot, "robot", 2499, Some(1999)),
      product_row(catalog.circuit, "circuit", 1499, None),
    ],
  );
  catalog
}

/// Accounts known to the fake auth service; every one signs in with [`PASSWORD`].
#[derive(Default)]
pub struct StaticAuthenticator {
  accounts: Mutex<Vec<AuthUser>>,
  signed_out: Mutex<Vec<String>>,
}

impl StaticAuthenticator {
  pub fn with(users: &[AuthUser]) -> Self {
    Self {
      accounts: Mutex::new(users.to_vec()),
      signed_out: Mutex::new(Vec::new()),
    }
  }

  /// Makes the auth service stop accepting `access_token`.
  pub fn revoke(&self, access_token: &str) {
    self.accounts.lock().retain(|u| u.access_token != access_token);
  }

  pub fn signed_out_tokens(&self) -> Vec<String> {
    self.signed_out.lock().clone()
  }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
  async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
    self
      .accounts
      .lock()
      .iter()
      .find(|u| u.email.as_deref() == Some(email) && password == PASSWORD)
      .cloned()
      .ok_or_else(|| AppError::Auth("Invalid login credentials".to_string()))
  }

  async fn user_for_token(&self, access_token: &str) -> Result<AuthUser> {
    self
      .accounts
      .lock()
      .iter()
      .find(|u| u.access_token == access_token)
      .cloned()
      .ok_or_else(|| AppError::Auth("Invalid JWT".to_string()))
  }

  async fn sign_out(&self, access_token: &str) -> Result<()> {
    self.signed_out.lock().push(access_token.to_string());
    Ok(())
  }
}

/// Records payment order requests and answers with a fixed gateway order.
#[derive(Default)]
pub struct RecordingFunctions {
  pub fail: bool,
  requests: Mutex<Vec<PaymentOrderRequest>>,
}

impl RecordingFunctions {
  pub fn failing() -> Self {
    Self {
      fail: true,
      ..Self::default()
    }
  }

  pub fn requests(&self) -> Vec<PaymentOrderRequest> {
    self.requests.lock().clone()
  }
}

#[async_trait]
impl FunctionGateway for RecordingFunctions {
  async fn create_payment_order(&self, _access_token: &str, request: &PaymentOrderRequest) -> Result<GatewayOrder> {
    self.requests.lock().push(request.clone());
    if self.fail {
      return Err(AppError::Function("create-razorpay-order returned 500".to_string()));
    }
    Ok(GatewayOrder {
      razorpay_key_id: "rzp_test_key".to_string(),
      amount: request.amount,
      currency: request.currency.clone(),
      razorpay_order_id: format!("order_{}", request.order_id.simple()),
    })
  }
}

pub struct Harness {
  pub store: Arc<MemoryStore>,
  pub auth: Arc<StaticAuthenticator>,
  pub functions: Arc<RecordingFunctions>,
  pub gateway: Arc<BrowserCheckout>,
  pub backend: Backend,
}

pub fn harness(users: &[AuthUser], functions: RecordingFunctions) -> Harness {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let auth = Arc::new(StaticAuthenticator::with(users));
  let functions = Arc::new(functions);
  let gateway = Arc::new(BrowserCheckout::new());
  let backend = Backend {
    config: Arc::new(AppConfig::for_backend("http://backend.test", "anon-key")),
    store: store.clone() as Arc<dyn RemoteStore>,
    auth: auth.clone(),
    functions: functions.clone(),
    payments: Arc::new(LazyPaymentGateway::ready(gateway.clone())),
    workflows: Arc::new(pipelines::build_registry()),
  };
  Harness {
    store,
    auth,
    functions,
    gateway,
    backend,
  }
}

/// Polls `check` until it holds, for at most two seconds.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
  F: FnMut() -> Fut,
  Fut: Future<Output = bool>,
{
  for _ in 0..200 {
    if check().await {
      return true;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  false
}
