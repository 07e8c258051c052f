//! The route handler for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{Email, PasswordHash, User, ValidatedPassword, create_user},
    envelope::{Envelope, JsonBody, render},
};

/// The state needed to register a user.
#[derive(Debug, Clone)]
pub struct SignUpState {
    /// The database connection for storing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used to hash new passwords.
    pub password_cost: u32,
}

impl FromRef<AppState> for SignUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// The request body for signing up.
///
/// Fields are optional so that a missing field can be reported with a helpful
/// message rather than a deserialization error.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub firstname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
struct SignUpResponse {
    user: User,
}

/// A route handler for creating a new user.
///
/// Responds with 201 and the new user (without the password hash), 400 if a
/// field is missing or invalid, or 409 if the email is already registered.
pub async fn sign_up(
    State(state): State<SignUpState>,
    JsonBody(request): JsonBody<SignUpRequest>,
) -> Response {
    match register(request, &state) {
        Ok(user) => {
            tracing::info!("Registered user {}", user.id);
            render(
                StatusCode::CREATED,
                Envelope::success()
                    .with_message("User account created successfully")
                    .with_payload(SignUpResponse { user }),
            )
        }
        Err(error) => error.into_auth_response(),
    }
}

fn register(request: SignUpRequest, state: &SignUpState) -> Result<User, Error> {
    let (Some(firstname), Some(email), Some(password)) = (
        non_blank(request.firstname),
        non_blank(request.email),
        request.password.filter(|password| !password.is_empty()),
    ) else {
        return Err(Error::Validation("All fields are required!".to_owned()));
    };

    let email = Email::new(&email)?;
    let password_hash = PasswordHash::new(ValidatedPassword::new(&password)?, state.password_cost)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    create_user(&firstname, &email, password_hash, &connection)
}

fn non_blank(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
