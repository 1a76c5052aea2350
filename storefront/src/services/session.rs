// storefront/src/services/session.rs

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

/// A signed-in identity. The access token authorizes backend calls made on
/// the user's behalf.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
  pub id: Uuid,
  pub email: Option<String>,
  #[serde(skip_serializing)]
  pub access_token: String,
}

/// Current identity of one visitor. Clones share the same session.
///
/// Subscribers are woken only when the identity changes: signing in as the
/// user already signed in, or signing out twice, notifies nobody.
#[derive(Debug, Clone)]
pub struct SessionStore {
  tx: Arc<watch::Sender<Option<AuthUser>>>,
}

impl Default for SessionStore {
  fn default() -> Self {
    Self::new()
  }
}

impl SessionStore {
  pub fn new() -> Self {
    let (tx, _rx) = watch::channel(None);
    Self { tx: Arc::new(tx) }
  }

  pub fn signed_in(user: AuthUser) -> Self {
    let store = Self::new();
    store.sign_in(user);
    store
  }

  pub fn current(&self) -> Option<AuthUser> {
    self.tx.borrow().clone()
  }

  pub fn is_signed_in(&self) -> bool {
    self.tx.borrow().is_some()
  }

  pub fn sign_in(&self, user: AuthUser) {
    let changed = self.tx.send_if_modified(|current| {
      if let Some(signed_in) = current.as_mut().filter(|u| u.id == user.id) {
        // Same identity: keep the refreshed credentials, wake no one.
        *signed_in = user;
        return false;
      }
      *current = Some(user);
      true
    });
    if changed {
      info!("Session identity changed: signed in.");
    }
  }

  pub fn sign_out(&self) {
    let changed = self.tx.send_if_modified(|current| current.take().is_some());
    if changed {
      info!("Session identity changed: signed out.");
    }
  }

  pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
    self.tx.subscribe()
  }
}
