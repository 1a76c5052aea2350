// storefront/src/services/mod.rs

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod functions;
pub mod notify;
pub mod payment;
pub mod session;
pub mod visitor;
