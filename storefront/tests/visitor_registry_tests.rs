// tests/visitor_registry_tests.rs
mod common;

use common::*;
use kidova_storefront::config::AppConfig;
use kidova_storefront::state::{AppState, Backend};
use std::sync::Arc;
use std::time::Duration;

/// App state whose cached tokens are re-verified on every lookup.
fn always_recheck(h: &Harness) -> AppState {
  let config = AppConfig {
    session_recheck_secs: 0,
    ..AppConfig::for_backend("http://backend.test", "anon-key")
  };
  AppState::new(Backend {
    config: Arc::new(config),
    ..h.backend.clone()
  })
}

#[tokio::test]
async fn cached_token_is_reused_within_recheck_window() {
  let alice = user("alice@example.com");
  let h = harness(&[alice.clone()], RecordingFunctions::default());
  let state = AppState::new(h.backend.clone());

  let first = state.visitor_for(Some(&alice.access_token)).await;
  h.auth.revoke(&alice.access_token);
  let second = state.visitor_for(Some(&alice.access_token)).await;

  assert!(Arc::ptr_eq(&first, &second));
  assert_eq!(state.visitor_count(), 1);
}

#[tokio::test]
async fn revoked_token_falls_back_to_anonymous_and_evicts_visitor() {
  let alice = user("alice@example.com");
  let h = harness(&[alice.clone()], RecordingFunctions::default());
  let state = always_recheck(&h);

  let admitted = state.admit(alice.clone());
  let resumed = state.visitor_for(Some(&alice.access_token)).await;
  assert!(Arc::ptr_eq(&admitted, &resumed));
  assert_eq!(resumed.user().map(|u| u.id), Some(alice.id));

  h.auth.revoke(&alice.access_token);
  let visitor = state.visitor_for(Some(&alice.access_token)).await;

  assert!(visitor.user().is_none());
  assert_eq!(state.visitor_count(), 0);
}

#[tokio::test]
async fn unknown_token_is_not_cached() {
  let h = harness(&[], RecordingFunctions::default());
  let state = AppState::new(h.backend.clone());

  let visitor = state.visitor_for(Some("token-nobody")).await;

  assert!(visitor.user().is_none());
  assert_eq!(state.visitor_count(), 0);
}

#[tokio::test]
async fn idle_visitors_are_swept() {
  let alice = user("alice@example.com");
  let bob = user("bob@example.com");
  let h = harness(&[alice.clone(), bob.clone()], RecordingFunctions::default());
  let state = AppState::new(h.backend.clone());
  state.admit(alice.clone());
  state.visitor_for(Some(&bob.access_token)).await;
  assert_eq!(state.visitor_count(), 2);

  assert_eq!(state.evict_idle(Duration::from_secs(3600)), 0);
  assert_eq!(state.visitor_count(), 2);

  assert_eq!(state.evict_idle(Duration::ZERO), 2);
  assert_eq!(state.visitor_count(), 0);
}
