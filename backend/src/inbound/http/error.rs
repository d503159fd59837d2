//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while letting Actix handlers
//! turn domain failures into status codes and plain-text bodies. Internal
//! errors are logged in full and returned redacted.

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode};
use crate::middleware::trace::TRACE_ID_HEADER;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Body returned in place of any internal error message.
pub const INTERNAL_ERROR_BODY: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn public_message(error: &Error) -> &str {
    match error.code() {
        ErrorCode::InternalError => INTERNAL_ERROR_BODY,
        _ => error.message(),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(
                message = self.message(),
                trace_id = self.trace_id().unwrap_or_default(),
                "internal error"
            );
        }

        let mut builder = HttpResponse::build(self.status_code());
        builder.content_type(ContentType::plaintext());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.body(public_message(self).to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::header;
    use rstest::{fixture, rstest};

    const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

    #[fixture]
    fn trace_id() -> String {
        TRACE_ID.to_owned()
    }

    async fn body_of(response: HttpResponse) -> String {
        let bytes = to_bytes(response.into_body())
            .await
            .expect("reading response body succeeds");
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    #[rstest]
    #[case(Error::invalid_request("name: must not be blank"), StatusCode::BAD_REQUEST)]
    #[case(Error::not_found("User not found"), StatusCode::NOT_FOUND)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
        assert_eq!(ResponseError::status_code(&error), status);
    }

    #[rstest]
    #[actix_web::test]
    async fn not_found_body_is_plain_text_message() {
        let response = Error::not_found("User not found").error_response();

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .expect("content type")
            .to_str()
            .expect("ascii header")
            .to_owned();
        assert!(content_type.starts_with("text/plain"));
        assert_eq!(body_of(response).await, "User not found");
    }

    #[rstest]
    #[actix_web::test]
    async fn internal_errors_are_redacted(trace_id: String) {
        let error = Error::internal("pool exhausted: secret detail").with_trace_id(trace_id);
        let response = error.error_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await, INTERNAL_ERROR_BODY);
    }

    #[rstest]
    #[actix_web::test]
    async fn trace_id_header_is_echoed(trace_id: String) {
        let response = Error::invalid_request("bad").with_trace_id(trace_id).error_response();
        let header = response
            .headers()
            .get(TRACE_ID_HEADER)
            .expect("trace id header")
            .to_str()
            .expect("ascii header");
        assert_eq!(header, TRACE_ID);
    }

    #[rstest]
    #[actix_web::test]
    async fn trace_id_header_is_absent_without_trace() {
        let response = Error::not_found("User not found").error_response();
        assert!(response.headers().get(TRACE_ID_HEADER).is_none());
    }
}
