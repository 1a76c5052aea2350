// storefront/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{auth_handlers, cart_handlers, catalog_handlers, checkout_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(health_check_handler))
    .service(
      web::scope("/auth")
        .route("/sign-in", web::post().to(auth_handlers::sign_in_handler))
        .route("/sign-out", web::post().to(auth_handlers::sign_out_handler)),
    )
    .route("/", web::get().to(catalog_handlers::home_handler))
    .route("/products/{slug}", web::get().to(catalog_handlers::product_handler))
    .service(
      web::scope("/cart")
        .route("", web::get().to(cart_handlers::view_cart_handler))
        .route("", web::delete().to(cart_handlers::clear_cart_handler))
        .route("/items", web::post().to(cart_handlers::add_to_cart_handler))
        .route("/items/{id}", web::patch().to(cart_handlers::update_cart_item_handler))
        .route("/items/{id}", web::delete().to(cart_handlers::remove_cart_item_handler)),
    )
    .service(
      web::scope("/checkout")
        .route("", web::get().to(checkout_handlers::checkout_page_handler))
        .route("", web::post().to(checkout_handlers::start_checkout_handler))
        .route("/payment", web::post().to(checkout_handlers::payment_callback_handler)),
    );
}
