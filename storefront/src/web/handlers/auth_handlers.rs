// storefront/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::CurrentVisitor;

#[derive(Deserialize, Debug)]
pub struct SigninRequestPayload {
  pub email: String,
  pub password: String,
}

#[instrument(
    name = "handler::sign_in",
    skip(app_state, req_payload),
    fields(req_email = %req_payload.email)
)]
pub async fn sign_in_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SigninRequestPayload>,
) -> Result<HttpResponse, AppError> {
  if req_payload.email.trim().is_empty() || req_payload.password.is_empty() {
    return Err(AppError::Validation("Email and password are required.".to_string()));
  }

  let user = app_state
    .backend
    .auth
    .sign_in(&req_payload.email, &req_payload.password)
    .await?;
  let access_token = user.access_token.clone();
  let visitor = app_state.admit(user.clone());
  info!(user_id = %user.id, visitors = app_state.visitor_count(), "Visitor signed in.");

  Ok(HttpResponse::Ok().json(json!({
      "accessToken": access_token,
      "user": user,
      "notices": visitor.drain_notices(),
  })))
}

#[instrument(name = "handler::sign_out", skip_all)]
pub async fn sign_out_handler(
  app_state: web::Data<AppState>,
  current: CurrentVisitor,
) -> Result<HttpResponse, AppError> {
  if let Some(token) = &current.token {
    app_state.release(token);
  }
  if let Err(e) = current.visitor.sign_out().await {
    warn!(error = %e, "Auth service sign-out failed; session dropped locally.");
  }
  Ok(HttpResponse::Ok().json(json!({ "message": "Signed out", "redirect": "/" })))
}
