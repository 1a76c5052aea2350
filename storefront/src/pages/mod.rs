// storefront/src/pages/mod.rs

//! View models of the storefront's pages, serialized as JSON.

pub mod cart;
pub mod checkout;
pub mod home;
pub mod product;

pub use cart::{CartLineView, CartPage, OrderSummary};
pub use checkout::{CheckoutPage, CheckoutStarted};
pub use home::{HomePage, ProductCard};
pub use product::ProductPage;
