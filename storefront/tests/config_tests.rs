// tests/config_tests.rs
mod common;

use common::*;
use kidova_storefront::config::{AppConfig, LogFormat};
use kidova_storefront::errors::AppError;
use serial_test::serial;
use std::env;

const VARS: [&str; 13] = [
  "SERVER_HOST",
  "SERVER_PORT",
  "SUPABASE_URL",
  "SUPABASE_ANON_KEY",
  "FUNCTIONS_URL",
  "PAYMENT_SCRIPT_URL",
  "STORE_CURRENCY",
  "BRAND_NAME",
  "THEME_COLOR",
  "HTTP_TIMEOUT_SECS",
  "SESSION_RECHECK_SECS",
  "VISITOR_IDLE_SECS",
  "LOG_FORMAT",
];

fn clear_env() {
  for var in VARS {
    env::remove_var(var);
  }
}

#[test]
#[serial]
fn defaults_apply_when_only_backend_is_set() {
  setup_tracing();
  clear_env();
  env::set_var("SUPABASE_URL", "https://demo.supabase.co/");
  env::set_var("SUPABASE_ANON_KEY", "anon");

  let config = AppConfig::from_env().unwrap();
  assert_eq!(config.server_port, 8080);
  assert_eq!(config.supabase_url, "https://demo.supabase.co");
  assert_eq!(config.rest_url(), "https://demo.supabase.co/rest/v1");
  assert_eq!(config.auth_url(), "https://demo.supabase.co/auth/v1");
  assert_eq!(config.functions_url, "https://demo.supabase.co/functions/v1");
  assert_eq!(config.currency, "INR");
  assert_eq!(config.brand_name, "Kidova Labs");
  assert_eq!(config.theme_color, "#FF6B35");
  assert_eq!(config.http_timeout_secs, None);
  assert_eq!(config.session_recheck_secs, 300);
  assert_eq!(config.visitor_idle_secs, 1800);
  assert_eq!(config.log_format, LogFormat::Pretty);
  clear_env();
}

#[test]
#[serial]
fn missing_backend_url_is_a_config_error() {
  setup_tracing();
  clear_env();
  env::set_var("SUPABASE_ANON_KEY", "anon");

  let err = AppConfig::from_env().unwrap_err();
  assert!(matches!(err, AppError::Config(_)));
  clear_env();
}

#[test]
#[serial]
fn overrides_are_parsed() {
  setup_tracing();
  clear_env();
  env::set_var("SUPABASE_URL", "https://demo.supabase.co");
  env::set_var("SUPABASE_ANON_KEY", "anon");
  env::set_var("SERVER_PORT", "9090");
  env::set_var("HTTP_TIMEOUT_SECS", "15");
  env::set_var("LOG_FORMAT", "JSON");
  env::set_var("STORE_CURRENCY", "USD");
  env::set_var("SESSION_RECHECK_SECS", "0");
  env::set_var("VISITOR_IDLE_SECS", "120");

  let config = AppConfig::from_env().unwrap();
  assert_eq!(config.server_port, 9090);
  assert_eq!(config.http_timeout_secs, Some(15));
  assert_eq!(config.log_format, LogFormat::Json);
  assert_eq!(config.currency, "USD");
  assert_eq!(config.session_recheck_secs, 0);
  assert_eq!(config.visitor_idle_secs, 120);

  env::set_var("SERVER_PORT", "not-a-port");
  assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));

  env::set_var("SERVER_PORT", "9090");
  env::set_var("VISITOR_IDLE_SECS", "soon");
  assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));
  clear_env();
}
