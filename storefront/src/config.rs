// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

pub const DEFAULT_SESSION_RECHECK_SECS: u64 = 300;
pub const DEFAULT_VISITOR_IDLE_SECS: u64 = 1800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  /// Project URL of the hosted backend, e.g. `https://xyz.supabase.co`.
  pub supabase_url: String,
  /// Public (anon) API key sent with every backend request.
  pub supabase_anon_key: String,
  /// Base URL of the invocable functions. Defaults to `{supabase_url}/functions/v1`.
  pub functions_url: String,

  /// Where the browser loads the payment SDK from.
  pub payment_script_url: String,
  pub currency: String,
  pub brand_name: String,
  pub theme_color: String,

  /// `None` leaves backend calls without a timeout.
  pub http_timeout_secs: Option<u64>,
  /// A cached visitor's token is checked with the auth service again once it
  /// was last verified this long ago.
  pub session_recheck_secs: u64,
  /// Visitors not seen for this long are dropped.
  pub visitor_idle_secs: u64,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let supabase_url = get_env("SUPABASE_URL")?.trim_end_matches('/').to_string();
    let supabase_anon_key = get_env("SUPABASE_ANON_KEY")?;
    let functions_url = get_env("FUNCTIONS_URL")
      .map(|u| u.trim_end_matches('/').to_string())
      .unwrap_or_else(|_| format!("{}/functions/v1", supabase_url));

    let payment_script_url =
      get_env("PAYMENT_SCRIPT_URL").unwrap_or_else(|_| "https://checkout.razorpay.com/v1/checkout.js".to_string());
    let currency = get_env("STORE_CURRENCY").unwrap_or_else(|_| "INR".to_string());
    let brand_name = get_env("BRAND_NAME").unwrap_or_else(|_| "Kidova Labs".to_string());
    let theme_color = get_env("THEME_COLOR").unwrap_or_else(|_| "#FF6B35".to_string());

    let http_timeout_secs = match get_env("HTTP_TIMEOUT_SECS") {
      Ok(raw) => Some(
        raw
          .parse::<u64>()
          .map_err(|e| AppError::Config(format!("Invalid HTTP_TIMEOUT_SECS: {}", e)))?,
      ),
      Err(_) => None,
    };

    let parse_secs = |var_name: &str, default: u64| match get_env(var_name) {
      Ok(raw) => raw
        .parse::<u64>()
        .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e))),
      Err(_) => Ok(default),
    };
    let session_recheck_secs = parse_secs("SESSION_RECHECK_SECS", DEFAULT_SESSION_RECHECK_SECS)?;
    let visitor_idle_secs = parse_secs("VISITOR_IDLE_SECS", DEFAULT_VISITOR_IDLE_SECS)?;

    let log_format = match get_env("LOG_FORMAT").unwrap_or_default().to_lowercase().as_str() {
      "json" => LogFormat::Json,
      "" | "pretty" => LogFormat::Pretty,
      other => return Err(AppError::Config(format!("Invalid LOG_FORMAT: {}", other))),
    };

    tracing::info!("Application configuration loaded successfully.");
    tracing::debug!(
      server_host = %server_host,
      server_port,
      supabase_url = %supabase_url,
      functions_url = %functions_url,
      currency = %currency,
      "Loaded config (API key redacted)"
    );

    Ok(Self {
      server_host,
      server_port,
      supabase_url,
      supabase_anon_key,
      functions_url,
      payment_script_url,
      currency,
      brand_name,
      theme_color,
      http_timeout_secs,
      session_recheck_secs,
      visitor_idle_secs,
      log_format,
    })
  }

  /// A configuration pointing at `base_url` with every optional setting at its
  /// default. Used by tests and local tooling.
  pub fn for_backend(base_url: &str, anon_key: &str) -> Self {
    let supabase_url = base_url.trim_end_matches('/').to_string();
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      functions_url: format!("{}/functions/v1", supabase_url),
      supabase_url,
      supabase_anon_key: anon_key.to_string(),
      payment_script_url: "https://checkout.razorpay.com/v1/checkout.js".to_string(),
      currency: "INR".to_string(),
      brand_name: "Kidova Labs".to_string(),
      theme_color: "#FF6B35".to_string(),
      http_timeout_secs: None,
      session_recheck_secs: DEFAULT_SESSION_RECHECK_SECS,
      visitor_idle_secs: DEFAULT_VISITOR_IDLE_SECS,
      log_format: LogFormat::Pretty,
    }
  }

  pub fn rest_url(&self) -> String {
    format!("{}/rest/v1", self.supabase_url)
  }

  pub fn auth_url(&self) -> String {
    format!("{}/auth/v1", self.supabase_url)
  }
}
