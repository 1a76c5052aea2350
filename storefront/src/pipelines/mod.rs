// storefront/src/pipelines/mod.rs

//! Workflows of the storefront, expressed as step pipelines.

use crate::errors::AppError;
use kidova_pipeline::Registry;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod contexts;

/// Registers every storefront pipeline with `registry`.
///
/// Called once at startup; pipelines are keyed by their context type.
pub fn register_all_pipelines(registry: &Registry<AppError>) {
  tracing::info!("Registering storefront pipelines...");

  cart_pipeline::register_add_to_cart_pipeline(registry);
  checkout_pipeline::register_checkout_pipeline(registry);

  tracing::info!("All storefront pipelines registered.");
}

pub fn build_registry() -> Registry<AppError> {
  let registry = Registry::new();
  register_all_pipelines(&registry);
  registry
}
