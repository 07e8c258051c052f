use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::OffsetDateTime;

use ledgerwise::{
    Email, Money, PasswordHash, ValidatedPassword, create_account, create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of ledgerwise.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
///
/// The database has one user, `test@example.com` with the password `test`,
/// who owns a cash account and a bank account.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        "Test",
        &Email::new("test@example.com")?,
        password_hash,
        &conn,
    )?;

    println!("Creating accounts...");

    let now = OffsetDateTime::now_utc().replace_nanosecond(0)?;
    create_account(user.id, "Cash", Money::from_cents(20_000), now, &conn)?;
    create_account(user.id, "Bank", Money::from_cents(250_000), now, &conn)?;

    println!("Success!");

    Ok(())
}
