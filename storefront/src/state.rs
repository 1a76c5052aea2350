// storefront/src/state.rs
use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::pipelines;
use crate::services::auth::{AuthClient, Authenticator};
use crate::services::functions::{FunctionGateway, HttpFunctionGateway};
use crate::services::payment::{BrowserCheckout, LazyPaymentGateway, PaymentGateway};
use crate::services::session::AuthUser;
use crate::services::visitor::Visitor;
use crate::store::rest::build_http_client;
use crate::store::{PostgrestStore, RemoteStore};

use kidova_pipeline::Registry;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Process-wide collaborators shared by every visitor.
#[derive(Clone)]
pub struct Backend {
  pub config: Arc<AppConfig>,
  /// Anonymous handle; visitors scope it to their own token.
  pub store: Arc<dyn RemoteStore>,
  pub auth: Arc<dyn Authenticator>,
  pub functions: Arc<dyn FunctionGateway>,
  pub payments: Arc<LazyPaymentGateway>,
  pub workflows: Arc<Registry<AppError>>,
}

impl Backend {
  /// Production wiring: hosted store, auth service and functions over one HTTP
  /// client, the browser-completed payment gateway loaded on first checkout.
  pub fn connect(config: AppConfig) -> Result<Self> {
    let client = build_http_client(&config)
      .map_err(|e| AppError::Config(format!("HTTP client could not be built: {}", e)))?;
    let store = PostgrestStore::new(client.clone(), &config);
    let auth = AuthClient::new(client.clone(), &config);
    let functions = HttpFunctionGateway::new(client, &config);
    let payments = LazyPaymentGateway::new(|| async {
      debug!("Payment gateway handle created.");
      Ok(Arc::new(BrowserCheckout::new()) as Arc<dyn PaymentGateway>)
    });

    Ok(Self {
      config: Arc::new(config),
      store: Arc::new(store),
      auth: Arc::new(auth),
      functions: Arc::new(functions),
      payments: Arc::new(payments),
      workflows: Arc::new(pipelines::build_registry()),
    })
  }
}

struct VisitorEntry {
  visitor: Arc<Visitor>,
  verified_at: Instant,
  last_seen: Instant,
}

impl VisitorEntry {
  fn new(visitor: Arc<Visitor>) -> Self {
    let now = Instant::now();
    Self {
      visitor,
      verified_at: now,
      last_seen: now,
    }
  }
}

#[derive(Clone)]
pub struct AppState {
  pub backend: Backend,
  visitors: Arc<RwLock<HashMap<String, VisitorEntry>>>,
}

impl AppState {
  pub fn new(backend: Backend) -> Self {
    Self {
      backend,
      visitors: Arc::new(RwLock::new(HashMap::new())),
    }
  }

  /// Starts a visitor for a freshly signed-in user, replacing any visitor
  /// already holding the same token.
  pub fn admit(&self, user: AuthUser) -> Arc<Visitor> {
    let token = user.access_token.clone();
    let visitor = Visitor::open(&self.backend, Some(user));
    self
      .visitors
      .write()
      .insert(token, VisitorEntry::new(Arc::clone(&visitor)));
    visitor
  }

  /// The visitor behind `token`. Tokens not seen before, and cached tokens
  /// last verified more than `session_recheck_secs` ago, are resolved through
  /// the auth service. A token the service no longer accepts evicts its
  /// visitor; unknown or missing tokens browse anonymously.
  pub async fn visitor_for(&self, token: Option<&str>) -> Arc<Visitor> {
    let Some(token) = token else {
      return Visitor::open(&self.backend, None);
    };
    let recheck_after = Duration::from_secs(self.backend.config.session_recheck_secs);
    let cached = self.visitors.write().get_mut(token).map(|entry| {
      entry.last_seen = Instant::now();
      (Arc::clone(&entry.visitor), entry.verified_at.elapsed() < recheck_after)
    });
    let cached = match cached {
      Some((visitor, true)) => return visitor,
      Some((visitor, false)) => Some(visitor),
      None => None,
    };

    match self.backend.auth.user_for_token(token).await {
      Ok(user) => {
        if let Some(visitor) = cached {
          if visitor.user().map(|u| u.id) == Some(user.id) {
            if let Some(entry) = self.visitors.write().get_mut(token) {
              entry.verified_at = Instant::now();
            }
            debug!(user_id = %user.id, "Visitor token re-verified.");
            return visitor;
          }
          self.release(token);
        }
        info!(user_id = %user.id, "Visitor resumed from token.");
        let visitor = Visitor::open(&self.backend, Some(user));
        let mut visitors = self.visitors.write();
        let entry = visitors
          .entry(token.to_string())
          .or_insert_with(|| VisitorEntry::new(visitor));
        Arc::clone(&entry.visitor)
      }
      Err(e) => {
        if cached.is_some() && self.release(token).is_some() {
          info!("Visitor evicted: token no longer accepted.");
        }
        warn!(error = %e, "Token not accepted; continuing anonymously.");
        Visitor::open(&self.backend, None)
      }
    }
  }

  pub fn release(&self, token: &str) -> Option<Arc<Visitor>> {
    self.visitors.write().remove(token).map(|entry| entry.visitor)
  }

  /// Drops visitors not seen within `max_idle`. Returns how many went.
  pub fn evict_idle(&self, max_idle: Duration) -> usize {
    let mut visitors = self.visitors.write();
    let before = visitors.len();
    visitors.retain(|_, entry| entry.last_seen.elapsed() < max_idle);
    let evicted = before - visitors.len();
    if evicted > 0 {
      info!(evicted, remaining = visitors.len(), "Idle visitors evicted.");
    }
    evicted
  }

  pub fn visitor_count(&self) -> usize {
    self.visitors.read().len()
  }
}
