//! The route handler for signing in and receiving a bearer token.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::{Email, JwtKeys, User, encode_jwt, get_user_by_email},
    envelope::{Envelope, JsonBody, render},
};

/// The state needed to perform a sign-in.
#[derive(Debug, Clone)]
pub struct SignInState {
    /// The keys used to sign the issued token.
    pub jwt_keys: JwtKeys,
    /// How long issued tokens stay valid.
    pub token_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SignInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            jwt_keys: state.jwt_keys.clone(),
            token_duration: state.token_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for signing in.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
struct SignInResponse {
    user: User,
    token: String,
}

/// Handler for sign-in requests.
///
/// On success the user and a bearer token are returned. An unknown email and
/// a wrong password produce the same 404 response so that the response does
/// not reveal which emails are registered.
pub async fn sign_in(
    State(state): State<SignInState>,
    JsonBody(request): JsonBody<SignInRequest>,
) -> Response {
    match authenticate(request, &state) {
        Ok((user, token)) => render(
            StatusCode::OK,
            Envelope::success()
                .with_message("Login successfully")
                .with_payload(SignInResponse { user, token }),
        ),
        Err(error) => error.into_auth_response(),
    }
}

fn authenticate(request: SignInRequest, state: &SignInState) -> Result<(User, String), Error> {
    let (Some(email), Some(password)) = (
        request.email.filter(|email| !email.trim().is_empty()),
        request.password.filter(|password| !password.is_empty()),
    ) else {
        return Err(Error::Validation("Provide Required Fields!".to_owned()));
    };

    let email = Email::new(&email).map_err(|_| Error::InvalidCredentials)?;

    let user = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        match get_user_by_email(&email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    let is_match = user.password_hash.verify(&password).map_err(|error| {
        tracing::error!("Error verifying password: {error}");
        Error::HashingError(error.to_string())
    })?;

    if !is_match {
        return Err(Error::InvalidCredentials);
    }

    let token = encode_jwt(
        user.id,
        OffsetDateTime::now_utc(),
        state.token_duration,
        &state.jwt_keys,
    )?;

    Ok((user, token))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        auth::{
            Email, PasswordHash, ValidatedPassword, create_user,
            sign_in::{SignInRequest, SignInState, sign_in},
            token::{DEFAULT_TOKEN_DURATION, JwtKeys, decode_jwt},
        },
        db::initialize,
        endpoints,
    };

    const PASSWORD: &str = "averysafeandsecurepassword";

    fn get_test_state() -> SignInState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        create_user(
            "Jane",
            &Email::new("jane@example.com").unwrap(),
            PasswordHash::new(ValidatedPassword::new_unchecked(PASSWORD), 4).unwrap(),
            &connection,
        )
        .expect("Could not create test user");

        SignInState {
            jwt_keys: JwtKeys::new("foobar"),
            token_duration: DEFAULT_TOKEN_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn get_test_server(state: SignInState) -> TestServer {
        let app = Router::new()
            .route(endpoints::SIGN_IN, post(sign_in))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn sign_in_succeeds_with_valid_credentials() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::SIGN_IN)
            .json(&SignInRequest {
                email: Some("Jane@Example.com".to_owned()),
                password: Some(PASSWORD.to_owned()),
            })
            .await;

        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["status"], "success");
        assert_eq!(body["user"]["firstname"], "Jane");
        let token = body["token"].as_str().expect("token should be a string");
        let claims = decode_jwt(token, &state.jwt_keys).expect("token should be valid");
        assert_eq!(claims.user_id.as_i64(), body["user"]["id"].as_i64().unwrap());
    }

    #[tokio::test]
    async fn sign_in_fails_with_wrong_password() {
        let server = get_test_server(get_test_state());

        let response = server
            .post(endpoints::SIGN_IN)
            .json(&SignInRequest {
                email: Some("jane@example.com".to_owned()),
                password: Some("definitelynotthepassword".to_owned()),
            })
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["message"], "Invalid email or password.");
    }

    #[tokio::test]
    async fn sign_in_fails_with_unknown_email() {
        let server = get_test_server(get_test_state());

        server
            .post(endpoints::SIGN_IN)
            .json(&SignInRequest {
                email: Some("nobody@example.com".to_owned()),
                password: Some(PASSWORD.to_owned()),
            })
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sign_in_fails_with_missing_credentials() {
        let server = get_test_server(get_test_state());

        server
            .post(endpoints::SIGN_IN)
            .json(&SignInRequest::default())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
