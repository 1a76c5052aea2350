// storefront/src/web/handlers/catalog_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::pages::{HomePage, ProductPage};
use crate::web::extractors::CurrentVisitor;

#[instrument(name = "handler::home", skip_all)]
pub async fn home_handler(current: CurrentVisitor) -> Result<HttpResponse, AppError> {
  let page = HomePage::build(&current.visitor).await?;
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::product", skip_all, fields(slug = %path.as_str()))]
pub async fn product_handler(current: CurrentVisitor, path: web::Path<String>) -> Result<HttpResponse, AppError> {
  let page = ProductPage::build(&current.visitor, &path).await?;
  Ok(HttpResponse::Ok().json(page))
}
