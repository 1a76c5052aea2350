// storefront/src/models/mod.rs

//! Rows of the hosted data store's tables, as this storefront reads and writes them.

pub mod cart_item;
pub mod category;
pub mod order;
pub mod order_item;
pub mod product;
pub mod profile;
pub mod review;

pub use cart_item::{CartItem, CartProduct, NewCartLine};
pub use category::Category;
pub use order::{NewOrder, Order, OrderStatus, PaymentConfirmation, PaymentStatus, ShippingDetails};
pub use order_item::{NewOrderItem, OrderItem};
pub use product::{effective_price, Product};
pub use profile::Profile;
pub use review::Review;
