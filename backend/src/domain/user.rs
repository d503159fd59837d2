//! User aggregate and the orders it owns.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::order::{Order, OrderDraft, OrderId};
use super::validation::{
    FieldViolation, Validate, ValidationErrors, check_email, check_not_blank,
};

/// Storage-generated surrogate key for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw key issued by the storage engine.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw key value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Application user owning zero or more orders.
///
/// ## Invariants
/// - `id` is `None` until the storage engine assigns it and is immutable
///   afterwards; only repositories can set it.
/// - Every order in `orders` carries this user's id as its back-reference
///   once the user is persisted.
/// - Orders removed from the collection are deleted when the user is saved.
///
/// Two users are equal when both `id` and `email` match. Transient users
/// (`id == None`) with the same email therefore compare equal.
#[derive(Debug, Clone)]
pub struct User {
    id: Option<UserId>,
    name: String,
    email: String,
    orders: Vec<Order>,
}

impl User {
    /// Build a transient user with no orders.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            orders: Vec::new(),
        }
    }

    /// Rebuild a user loaded from storage together with its orders.
    pub fn from_parts(id: UserId, name: String, email: String, orders: Vec<Order>) -> Self {
        Self {
            id: Some(id),
            name,
            email,
            orders,
        }
    }

    /// Surrogate key, absent until persisted.
    pub fn id(&self) -> Option<UserId> {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Contact email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Owned orders in persistence order.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Replace the display name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Replace the contact email.
    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    /// Copy `name` and `email` from `source`, leaving orders untouched.
    pub fn merge_profile(&mut self, source: &Self) {
        self.name.clone_from(&source.name);
        self.email.clone_from(&source.email);
    }

    /// Attach an order, pointing its back-reference at this user.
    pub fn add_order(&mut self, mut order: Order) {
        order.set_user_id(self.id);
        self.orders.push(order);
    }

    /// Detach the order with `order_id`, returning it when present.
    ///
    /// Saving the user afterwards deletes the detached order.
    pub fn remove_order(&mut self, order_id: OrderId) -> Option<Order> {
        let position = self
            .orders
            .iter()
            .position(|order| order.id() == Some(order_id))?;
        let mut removed = self.orders.remove(position);
        removed.set_user_id(None);
        Some(removed)
    }

    /// Split the aggregate into its fields.
    pub fn into_parts(self) -> (Option<UserId>, String, String, Vec<Order>) {
        (self.id, self.name, self.email, self.orders)
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.email == other.email
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.email.hash(state);
    }
}

impl Validate for User {
    fn violations(&self) -> Vec<FieldViolation> {
        profile_violations(Some(self.name.as_str()), Some(self.email.as_str()))
    }
}

fn profile_violations(name: Option<&str>, email: Option<&str>) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    check_not_blank("name", name, &mut violations);
    check_not_blank("email", email, &mut violations);
    check_email("email", email, &mut violations);
    violations
}

/// Unvalidated user fields received from a caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDraft {
    /// Display name; required and non-blank.
    pub name: Option<String>,
    /// Contact email; required, non-blank and well formed.
    pub email: Option<String>,
    /// Orders to attach when the user is created.
    pub orders: Vec<OrderDraft>,
}

impl UserDraft {
    /// Validate the draft and turn it into a transient [`User`] owning the
    /// drafted orders.
    ///
    /// # Errors
    /// Returns [`ValidationErrors`] listing every violated constraint, profile
    /// fields first and then each order in turn.
    ///
    /// # Examples
    /// ```
    /// use orders_api::domain::{OrderDraft, UserDraft};
    ///
    /// let draft = UserDraft {
    ///     name: Some("John Doe".into()),
    ///     email: Some("john.doe@example.com".into()),
    ///     orders: vec![OrderDraft {
    ///         product: Some("Lamp".into()),
    ///         ..OrderDraft::default()
    ///     }],
    /// };
    /// let user = draft.into_user().expect("valid draft");
    /// assert!(user.id().is_none());
    /// assert_eq!(user.orders()[0].product(), "Lamp");
    /// ```
    pub fn into_user(self) -> Result<User, ValidationErrors> {
        self.validate()?;
        let Self {
            name,
            email,
            orders,
        } = self;
        let mut user = User::new(name.unwrap_or_default(), email.unwrap_or_default());
        for order in orders {
            user.add_order(order.into_order()?);
        }
        Ok(user)
    }

    /// Drop drafted orders, keeping only the profile fields.
    pub fn into_profile(self) -> Self {
        Self {
            orders: Vec::new(),
            ..self
        }
    }
}

impl Validate for UserDraft {
    fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = profile_violations(self.name.as_deref(), self.email.as_deref());
        for order in &self.orders {
            violations.extend(order.violations());
        }
        violations
    }
}
