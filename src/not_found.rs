//! The fallback handler for requests that do not match any route.

use axum::{http::StatusCode, response::Response};

use crate::envelope::{Envelope, render};

pub async fn get_404_not_found() -> Response {
    render(StatusCode::NOT_FOUND, Envelope::failed("Route Not Found"))
}
