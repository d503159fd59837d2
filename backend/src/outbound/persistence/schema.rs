//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Application users.
    users (id) {
        /// Primary key generated by `BIGSERIAL`.
        id -> Int8,
        /// Display name.
        name -> Varchar,
        /// Contact email.
        email -> Varchar,
    }
}

diesel::table! {
    /// Orders owned by users.
    ///
    /// `user_id` cascades on delete from `users.id`.
    orders (id) {
        /// Primary key generated by `BIGSERIAL`.
        id -> Int8,
        /// Ordered product name.
        product -> Varchar,
        /// Optional order amount.
        amount -> Nullable<Float8>,
        /// Optional free-text status.
        status -> Nullable<Varchar>,
        /// Owning user.
        user_id -> Int8,
    }
}

diesel::joinable!(orders -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(orders, users);
