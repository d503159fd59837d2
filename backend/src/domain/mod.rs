//! Domain primitives and aggregates.
//!
//! Purpose: Define the user/order aggregate, its validation rules and the
//! transport-agnostic error type shared by inbound and outbound adapters.
//!
//! Public surface:
//! - User, UserId, UserDraft — user aggregate, key and request payload.
//! - Order, OrderId, OrderDraft — owned order entity, key and payload.
//! - Error, ErrorCode — domain failure and its stable category.
//! - Validate — field constraint checking shared by entities and drafts.
//! - UserService — implementation of the driving ports.

pub mod error;
pub mod order;
pub mod ports;
pub mod user;
pub mod user_service;
pub mod validation;

pub use self::error::{Error, ErrorCode};
pub use self::order::{Order, OrderDraft, OrderId};
pub use self::user::{User, UserDraft, UserId};
pub use self::user_service::{ORDER_NOT_FOUND_MESSAGE, USER_NOT_FOUND_MESSAGE, UserService};
pub use self::validation::{FieldViolation, Validate, ValidationErrors};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use orders_api::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<u32> {
///     Err(Error::not_found("User not found"))
/// }
///
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
