//! Users API handlers.
//!
//! ```text
//! GET    /api/users
//! GET    /api/users/{id}
//! POST   /api/users        {"name":"John Doe","email":"john.doe@example.com"}
//! PUT    /api/users/{id}   {"name":"John Doe","email":"john.doe@example.com"}
//! DELETE /api/users/{id}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, error, get, post, put, web};
use tracing::debug;

use crate::domain::{Error, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::{UserDetailsView, UserRequest, UserSummaryView};

/// Body returned when a request body is not valid JSON for [`UserRequest`].
pub const MALFORMED_BODY_MESSAGE: &str = "Malformed request body";

/// Body returned when the `{id}` segment is not an integer.
pub const INVALID_ID_MESSAGE: &str = "Invalid user id";

/// Register the `/api/users` scope, including extractor error handlers.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use actix_web::{App, web};
/// use orders_api::inbound::http::state::HttpState;
/// use orders_api::inbound::http::users;
/// use orders_api::outbound::memory::InMemoryStore;
///
/// let store = Arc::new(InMemoryStore::new());
/// let state = HttpState::from_repositories(store.clone(), store);
/// let app = App::new()
///     .app_data(web::Data::new(state))
///     .configure(users::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .service(list_users)
            .service(get_user)
            .service(create_user)
            .service(update_user)
            .service(delete_user),
    );
}

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected request body");
    Error::invalid_request(MALFORMED_BODY_MESSAGE).into()
}

fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected path parameter");
    Error::invalid_request(INVALID_ID_MESSAGE).into()
}

/// List every user in summary form.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users", body = [UserSummaryView]),
        (status = 500, description = "Internal server error", body = String, content_type = "text/plain")
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<UserSummaryView>>> {
    let users = state.users.list_users().await?;
    Ok(web::Json(users.iter().map(UserSummaryView::from).collect()))
}

/// Fetch one user with its orders.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserDetailsView),
        (status = 400, description = "Invalid id", body = String, content_type = "text/plain"),
        (status = 404, description = "User not found", body = String, content_type = "text/plain"),
        (status = 500, description = "Internal server error", body = String, content_type = "text/plain")
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<UserDetailsView>> {
    let user = state.users.get_user(UserId::new(path.into_inner())).await?;
    Ok(web::Json(UserDetailsView::from(&user)))
}

/// Create a user together with any orders in the body.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "Created user", body = UserDetailsView),
        (status = 400, description = "Validation failed", body = String, content_type = "text/plain"),
        (status = 500, description = "Internal server error", body = String, content_type = "text/plain")
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<UserRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .users_command
        .create_user(payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(UserDetailsView::from(&user)))
}

/// Replace a user's name and email, keeping its orders.
///
/// An `orders` array in the body is ignored.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserDetailsView),
        (status = 400, description = "Validation failed", body = String, content_type = "text/plain"),
        (status = 404, description = "User not found", body = String, content_type = "text/plain"),
        (status = 500, description = "Internal server error", body = String, content_type = "text/plain")
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<UserRequest>,
) -> ApiResult<web::Json<UserDetailsView>> {
    let user = state
        .users_command
        .update_user(UserId::new(path.into_inner()), payload.into_inner().into())
        .await?;
    Ok(web::Json(UserDetailsView::from(&user)))
}

/// Delete a user and every order it owns.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid id", body = String, content_type = "text/plain"),
        (status = 404, description = "User not found", body = String, content_type = "text/plain"),
        (status = 500, description = "Internal server error", body = String, content_type = "text/plain")
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .users_command
        .delete_user(UserId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
