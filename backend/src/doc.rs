//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/users` operation, the health probes and
//! the response projections. The document is served by Swagger UI in debug
//! builds and exported by `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::domain::ErrorCode;
use crate::inbound::http::views::{
    OrderRequest, OrderView, UserDetailsView, UserRequest, UserSummaryView,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Orders API",
        description = "CRUD interface for users and the orders they own, plus health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserRequest,
        OrderRequest,
        UserSummaryView,
        UserDetailsView,
        OrderView,
        ErrorCode
    )),
    tags(
        (name = "users", description = "Users and their orders"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
