// storefront/src/main.rs

use kidova_storefront::config::AppConfig;
use kidova_storefront::init_tracing;
use kidova_storefront::state::{AppState, Backend};
use kidova_storefront::web::configure_app_routes;

use actix_web::{web as actix_data, App, HttpServer};
use std::time::Duration;

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      eprintln!("Configuration error: {}", e);
      std::process::exit(1);
    }
  };
  init_tracing(app_config.log_format);
  tracing::info!("Starting storefront server...");

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let visitor_idle = Duration::from_secs(app_config.visitor_idle_secs);

  let backend = match Backend::connect(app_config) {
    Ok(backend) => backend,
    Err(e) => {
      tracing::error!(error = %e, "Failed to set up backend clients.");
      std::process::exit(1);
    }
  };
  tracing::info!(supabase_url = %backend.config.supabase_url, "Backend clients ready.");

  let app_state = AppState::new(backend);

  let sweeper_state = app_state.clone();
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(visitor_idle.max(MIN_SWEEP_INTERVAL));
    loop {
      ticker.tick().await;
      sweeper_state.evict_idle(visitor_idle);
    }
  });

  tracing::info!("Attempting to bind server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
