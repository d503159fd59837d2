//! Order entity owned by exactly one user once attached.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::user::UserId;
use super::validation::{FieldViolation, Validate, ValidationErrors, check_not_blank};

/// Storage-generated surrogate key for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Wrap a raw key issued by the storage engine.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw key value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for OrderId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A product order.
///
/// ## Invariants
/// - `id` is `None` until the storage engine assigns it on first insert and
///   never changes afterwards.
/// - `user_id` points back at the owning user; the owner itself is never
///   embedded, so walking user → orders cannot cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: Option<OrderId>,
    product: String,
    amount: Option<f64>,
    status: Option<String>,
    user_id: Option<UserId>,
}

impl Order {
    /// Build a transient order with no owner yet.
    pub fn new(product: impl Into<String>, amount: Option<f64>, status: Option<String>) -> Self {
        Self {
            id: None,
            product: product.into(),
            amount,
            status,
            user_id: None,
        }
    }

    /// Rebuild an order loaded from storage.
    pub fn from_parts(
        id: OrderId,
        product: String,
        amount: Option<f64>,
        status: Option<String>,
        user_id: UserId,
    ) -> Self {
        Self {
            id: Some(id),
            product,
            amount,
            status,
            user_id: Some(user_id),
        }
    }

    /// Surrogate key, absent until persisted.
    pub fn id(&self) -> Option<OrderId> {
        self.id
    }

    /// Ordered product name.
    pub fn product(&self) -> &str {
        self.product.as_str()
    }

    /// Order amount, if recorded.
    pub fn amount(&self) -> Option<f64> {
        self.amount
    }

    /// Free-text status label.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Owning user, once attached.
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Replace the product name.
    pub fn set_product(&mut self, product: impl Into<String>) {
        self.product = product.into();
    }

    /// Replace the amount.
    pub fn set_amount(&mut self, amount: Option<f64>) {
        self.amount = amount;
    }

    /// Replace the status label.
    pub fn set_status(&mut self, status: Option<String>) {
        self.status = status;
    }

    /// Point the back-reference at `user_id`.
    pub fn set_user_id(&mut self, user_id: Option<UserId>) {
        self.user_id = user_id;
    }
}

impl Validate for Order {
    fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        check_not_blank("product", Some(self.product.as_str()), &mut violations);
        violations
    }
}

/// Unvalidated order fields received from a caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderDraft {
    /// Product name; required and non-blank.
    pub product: Option<String>,
    /// Optional amount.
    pub amount: Option<f64>,
    /// Optional free-text status.
    pub status: Option<String>,
}

impl OrderDraft {
    /// Validate the draft and turn it into a transient [`Order`].
    ///
    /// # Errors
    /// Returns [`ValidationErrors`] when `product` is blank.
    pub fn into_order(self) -> Result<Order, ValidationErrors> {
        self.validate()?;
        let Self {
            product,
            amount,
            status,
        } = self;
        Ok(Order::new(product.unwrap_or_default(), amount, status))
    }
}

impl Validate for OrderDraft {
    fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        check_not_blank("product", self.product.as_deref(), &mut violations);
        violations
    }
}
