// storefront/src/web/extractors.rs

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use std::sync::Arc;

use crate::errors::AppError;
use crate::services::visitor::Visitor;
use crate::state::AppState;

/// `Authorization: Bearer <token>`, if present.
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
  req
    .headers()
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(|t| t.trim().to_string())
    .filter(|t| !t.is_empty())
}

/// The visitor making the request. Requests without a usable bearer token get
/// a fresh anonymous visitor.
pub struct CurrentVisitor {
  pub visitor: Arc<Visitor>,
  pub token: Option<String>,
}

impl FromRequest for CurrentVisitor {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let app_state = req.app_data::<web::Data<AppState>>().cloned();
    let token = bearer_token(req);
    Box::pin(async move {
      let app_state = app_state.ok_or_else(|| AppError::Internal("Application state is not configured".to_string()))?;
      let visitor = app_state.visitor_for(token.as_deref()).await;
      Ok(CurrentVisitor { visitor, token })
    })
  }
}
