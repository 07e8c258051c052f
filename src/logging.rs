//! Middleware for logging requests and responses.

use axum::{
    body::Bytes,
    extract::Request,
    http::{StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::envelope::{Envelope, render};

/// JSON fields whose values never reach the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "token"];

const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body logged at the `debug` level.
/// Passwords and tokens in JSON bodies are replaced with asterisks.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return render(
                StatusCode::BAD_REQUEST,
                Envelope::failed("Could not read request body."),
            );
        }
    };

    log_body(
        &format!("Received request: {parts:#?}"),
        &display_body(&body_bytes, is_json(parts.headers.get(CONTENT_TYPE))),
    );

    let request = Request::from_parts(parts, body_bytes.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_body(
        &format!("Sending response: {parts:#?}"),
        &display_body(&body_bytes, is_json(parts.headers.get(CONTENT_TYPE))),
    );

    Response::from_parts(parts, body_bytes.into())
}

fn is_json(content_type: Option<&axum::http::HeaderValue>) -> bool {
    content_type
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

/// The text to log for a body, with sensitive JSON fields redacted.
fn display_body(body: &Bytes, is_json: bool) -> String {
    if is_json && let Ok(mut value) = serde_json::from_slice::<Value>(body) {
        redact(&mut value);
        return value.to_string();
    }

    String::from_utf8_lossy(body).into_owned()
}

fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *field = Value::String("********".to_owned());
                } else {
                    redact(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

fn log_body(headline: &str, body: &str) {
    match body.char_indices().nth(LOG_BODY_LENGTH_LIMIT) {
        Some((cutoff, _)) => {
            tracing::info!("{headline}\nbody: {}...", &body[..cutoff]);
            tracing::debug!("Full body: {body:?}");
        }
        None => tracing::info!("{headline}\nbody: {body:?}"),
    }
}
