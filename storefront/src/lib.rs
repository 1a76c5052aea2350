// storefront/src/lib.rs

//! Kidova storefront backend-for-frontend.
//!
//! Each visitor gets a server-side [`services::visitor::Visitor`] holding their
//! session, cart and pending checkout. Persistence, authentication and payment
//! order creation are delegated to the hosted backend.

pub mod config;
pub mod errors;
pub mod models;
pub mod pages;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

use crate::config::LogFormat;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);

  let installed = match format {
    LogFormat::Json => builder.json().try_init(),
    LogFormat::Pretty => builder.try_init(),
  };
  if installed.is_err() {
    tracing::debug!("Tracing subscriber already installed.");
  }
}
