// storefront/src/services/notify.rs

//! Transient, user-visible notices ("toasts").

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
  Success,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
  pub level: NoticeLevel,
  pub message: String,
}

pub trait Notifier: Send + Sync {
  fn notify(&self, notice: Notice);

  fn success(&self, message: &str) {
    self.notify(Notice {
      level: NoticeLevel::Success,
      message: message.to_string(),
    });
  }

  fn error(&self, message: &str) {
    self.notify(Notice {
      level: NoticeLevel::Error,
      message: message.to_string(),
    });
  }
}

/// Notices waiting for the visitor's next page view. When full, the oldest
/// notice is dropped.
#[derive(Debug)]
pub struct NoticeQueue {
  capacity: usize,
  pending: Mutex<VecDeque<Notice>>,
}

impl Default for NoticeQueue {
  fn default() -> Self {
    Self::with_capacity(16)
  }
}

impl NoticeQueue {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      capacity: capacity.max(1),
      pending: Mutex::new(VecDeque::new()),
    }
  }

  pub fn drain(&self) -> Vec<Notice> {
    self.pending.lock().drain(..).collect()
  }

  pub fn len(&self) -> usize {
    self.pending.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl Notifier for NoticeQueue {
  fn notify(&self, notice: Notice) {
    let mut pending = self.pending.lock();
    if pending.len() == self.capacity {
      pending.pop_front();
    }
    pending.push_back(notice);
  }
}

/// Texts of the notices raised by the cart and checkout flows.
pub mod messages {
  pub const CART_LOAD_FAILED: &str = "Failed to load cart";
  pub const SIGN_IN_TO_ADD: &str = "Please sign in to add items to cart";
  pub const ADDED_TO_CART: &str = "Added to cart!";
  pub const ADD_FAILED: &str = "Failed to add to cart";
  pub const REMOVED_FROM_CART: &str = "Removed from cart";
  pub const REMOVE_FAILED: &str = "Failed to remove item";
  pub const UPDATE_FAILED: &str = "Failed to update quantity";
  pub const CLEAR_FAILED: &str = "Failed to clear cart";
  pub const CHECKOUT_FAILED: &str = "Failed to process checkout";
  pub const ORDER_PLACED: &str = "Order placed successfully!";
}
