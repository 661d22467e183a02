use axum::{http::StatusCode, response::Response};

use crate::{ErrorBody, error_response};

/// The fallback handler for requests that do not match any route.
pub async fn get_404_not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, ErrorBody::new("Not found"))
}
