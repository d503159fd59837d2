//! Field-level validation rules evaluated before persistence.
//!
//! Rules run in field declaration order and collect every violation. Adapters
//! surface only the first one as `"<field>: <message>"`, falling back to
//! [`GENERIC_VALIDATION_MESSAGE`] when no field detail is available.

use std::fmt;

use validator::ValidateEmail;

/// Message reported when a validation failure carries no field detail.
pub const GENERIC_VALIDATION_MESSAGE: &str = "Validation error";

/// Message attached to blank required fields.
pub const NOT_BLANK_MESSAGE: &str = "must not be blank";

/// Message attached to malformed email addresses.
pub const EMAIL_MESSAGE: &str = "must be a well-formed email address";

/// A single constraint violation on a named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    field: &'static str,
    message: String,
}

impl FieldViolation {
    /// Record a violation for `field`.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Human-readable constraint message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Ordered set of violations produced by one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    /// Wrap the collected violations.
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self(violations)
    }

    /// All violations in evaluation order.
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Whether the pass found nothing to report.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the first violation as `"<field>: <message>"`.
    ///
    /// # Examples
    /// ```
    /// use orders_api::domain::validation::{FieldViolation, ValidationErrors};
    ///
    /// let errors = ValidationErrors::new(vec![
    ///     FieldViolation::new("name", "must not be blank"),
    ///     FieldViolation::new("email", "must not be blank"),
    /// ]);
    /// assert_eq!(errors.first_message(), "name: must not be blank");
    /// assert_eq!(ValidationErrors::default().first_message(), "Validation error");
    /// ```
    pub fn first_message(&self) -> String {
        self.0
            .first()
            .map_or_else(|| GENERIC_VALIDATION_MESSAGE.to_owned(), ToString::to_string)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.first_message())
    }
}

impl std::error::Error for ValidationErrors {}

/// Types that can check their own field constraints.
pub trait Validate {
    /// Return every violation found, in field declaration order.
    fn violations(&self) -> Vec<FieldViolation>;

    /// Succeed when no constraint is violated.
    fn validate(&self) -> Result<(), ValidationErrors> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(violations))
        }
    }
}

/// Reject absent, empty or whitespace-only values.
pub(crate) fn check_not_blank(
    field: &'static str,
    value: Option<&str>,
    violations: &mut Vec<FieldViolation>,
) {
    if value.is_none_or(|raw| raw.trim().is_empty()) {
        violations.push(FieldViolation::new(field, NOT_BLANK_MESSAGE));
    }
}

/// Reject present values that are not email addresses.
///
/// Absent or empty values pass; pair with [`check_not_blank`] to require them.
pub(crate) fn check_email(
    field: &'static str,
    value: Option<&str>,
    violations: &mut Vec<FieldViolation>,
) {
    if let Some(raw) = value
        && !raw.is_empty()
        && !is_valid_email(raw)
    {
        violations.push(FieldViolation::new(field, EMAIL_MESSAGE));
    }
}

/// Check email syntax.
///
/// The local part is a dot-atom of at most 64 characters in which any
/// non-ASCII character is allowed. The domain is a hostname, an IP literal in
/// brackets or an internationalised name, checked by `validator`.
///
/// # Examples
/// ```
/// use orders_api::domain::validation::is_valid_email;
///
/// assert!(is_valid_email("john.doe@example.com"));
/// assert!(is_valid_email("josé@example.com"));
/// assert!(is_valid_email("john@[127.0.0.1]"));
/// assert!(!is_valid_email("invalid-email"));
/// ```
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if local.split('.').any(str::is_empty) {
        return false;
    }
    // validator only knows the ASCII atom set; stand in for wider characters.
    let widened: String = local
        .chars()
        .map(|c| if c.is_ascii() { c } else { 'x' })
        .collect();
    format!("{widened}@{domain}").validate_email()
}
