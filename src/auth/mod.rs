//! User accounts, credentials and bearer token authentication.

mod credentials;
mod middleware;
mod sign_in;
mod sign_up;
mod token;
mod user;

pub use credentials::{Email, PasswordHash, ValidatedPassword};
pub use middleware::auth_guard;
pub use sign_in::sign_in;
pub use sign_up::sign_up;
pub use token::{DEFAULT_TOKEN_DURATION, JwtKeys, encode_jwt};
pub use user::{
    User, UserID, create_user, create_user_table, get_monthly_budget, get_user_by_email,
    update_monthly_budget,
};
