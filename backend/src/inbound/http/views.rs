//! Response shapes for the users resource.
//!
//! Two projections exist per user. The summary view carries only scalar
//! profile fields and never has an `orders` key; the details view always
//! has one, even when empty. Orders never carry their owner, so
//! serialization cannot cycle.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Order, OrderDraft, OrderId, User, UserDraft, UserId};

/// Request body for creating or updating a user.
///
/// Example JSON:
/// `{"name":"John Doe","email":"john.doe@example.com","orders":[{"product":"Lamp"}]}`
///
/// `orders` is honoured on create only; updates ignore it.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UserRequest {
    /// Display name; required and non-blank.
    pub name: Option<String>,
    /// Contact email; required and well formed.
    pub email: Option<String>,
    /// Orders created together with the user.
    #[serde(default)]
    pub orders: Vec<OrderRequest>,
}

impl From<UserRequest> for UserDraft {
    fn from(value: UserRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            orders: value.orders.into_iter().map(OrderDraft::from).collect(),
        }
    }
}

/// Order embedded in a [`UserRequest`].
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct OrderRequest {
    /// Product name; required and non-blank.
    pub product: Option<String>,
    /// Optional amount.
    pub amount: Option<f64>,
    /// Optional free-text status.
    pub status: Option<String>,
}

impl From<OrderRequest> for OrderDraft {
    fn from(value: OrderRequest) -> Self {
        Self {
            product: value.product,
            amount: value.amount,
            status: value.status,
        }
    }
}

/// Summary projection used by list responses.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserSummaryView {
    /// Surrogate key.
    pub id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
}

impl From<&User> for UserSummaryView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().map(UserId::get),
            name: user.name().to_owned(),
            email: user.email().to_owned(),
        }
    }
}

/// Order as embedded in [`UserDetailsView`].
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderView {
    /// Surrogate key.
    pub id: Option<i64>,
    /// Ordered product name.
    pub product: String,
    /// Order amount; `null` when unset.
    pub amount: Option<f64>,
    /// Free-text status; `null` when unset.
    pub status: Option<String>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().map(OrderId::get),
            product: order.product().to_owned(),
            amount: order.amount(),
            status: order.status().map(str::to_owned),
        }
    }
}

/// Details projection used by single-user responses.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserDetailsView {
    /// Surrogate key.
    pub id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Owned orders, possibly empty.
    pub orders: Vec<OrderView>,
}

impl From<&User> for UserDetailsView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().map(UserId::get),
            name: user.name().to_owned(),
            email: user.email().to_owned(),
            orders: user.orders().iter().map(OrderView::from).collect(),
        }
    }
}
