//! The JSON envelope shared by every API response.
//!
//! Every body has the shape `{"status": "success" | "failed" | "warning",
//! "message"?: string, ...payload}`, for errors as well as successes.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::Error;

/// A JSON request body whose rejections are reported in the envelope format
/// instead of axum's plain text.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Path parameters with rejections reported in the envelope format.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParam<T>(pub T);

/// Query parameters with rejections reported in the envelope format.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);

/// The outcome reported in the `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Failed,
    Warning,
}

/// Marker payload for envelopes that carry nothing besides the status and message.
#[derive(Debug, Serialize)]
pub struct NoPayload {}

/// A response body with the status and optional message alongside the payload fields.
#[derive(Debug, Serialize)]
pub struct Envelope<T = NoPayload> {
    status: EnvelopeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(flatten)]
    payload: T,
}

impl Envelope<NoPayload> {
    pub fn success() -> Self {
        Self {
            status: EnvelopeStatus::Success,
            message: None,
            payload: NoPayload {},
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            status: EnvelopeStatus::Failed,
            message: Some(message.to_owned()),
            payload: NoPayload {},
        }
    }

    pub fn warning(message: &str) -> Self {
        Self {
            status: EnvelopeStatus::Warning,
            message: Some(message.to_owned()),
            payload: NoPayload {},
        }
    }
}

impl<T> Envelope<T> {
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_owned());
        self
    }

    /// Replace the payload. The payload must serialize as a JSON object since
    /// its fields are merged into the top level of the body.
    pub fn with_payload<U: Serialize>(self, payload: U) -> Envelope<U> {
        Envelope {
            status: self.status,
            message: self.message,
            payload,
        }
    }
}

/// Render `envelope` as a JSON response with the given status code.
pub fn render<T: Serialize>(status_code: StatusCode, envelope: Envelope<T>) -> Response {
    (status_code, Json(envelope)).into_response()
}
