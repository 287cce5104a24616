//! SQLite persistence for waitlist and honeypot entries.

use core::str::FromStr as _;
use std::path::Path;

use chrono::NaiveDateTime;
use sqlx::{
    Error as SqlError, FromRow,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
};
use tracing::debug;

pub type Pool = SqlitePool;

/// Path that selects a private in-memory database instead of a file.
pub const IN_MEMORY: &str = ":memory:";

/// Prefix of SQLite URI filenames such as `file:waitlist.db?mode=ro`.
const URI_PREFIX: &str = "file:";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS waitlist (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS waitlist_honeypot (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL,
    trap_value TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
";

/// A genuine signup.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct WaitlistEntry {
    pub id: i64,
    pub email: String,
    pub created_at: NaiveDateTime,
}

/// A submission that filled in the hidden trap field.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct HoneypotEntry {
    pub id: i64,
    pub email: String,
    pub trap_value: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("failed to connect to database")]
    Connection(#[source] sqlx::Error),
    #[error("failed to apply database schema")]
    Schema(#[source] sqlx::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    #[error("email already registered")]
    Duplicate,
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

/// Open (creating if missing) the database at `path` and ensure the schema exists.
///
/// # Errors
///
/// Returns [`InitError::Connection`] if the database cannot be opened and
/// [`InitError::Schema`] if the schema cannot be applied.
#[tracing::instrument]
pub async fn init(path: &Path) -> Result<Pool, InitError> {
    let pool = connect(path).await.map_err(InitError::Connection)?;
    if let Err(err) = initialize(&pool).await {
        pool.close().await;
        return Err(err);
    }
    Ok(pool)
}

/// Whether `path` names an ordinary file, rather than the in-memory database
/// or a `file:` URI.
#[must_use]
pub fn is_plain_file(path: &Path) -> bool {
    path != Path::new(IN_MEMORY) && uri_target(path).is_none()
}

/// The part after `file:` when `path` is a SQLite URI filename.
fn uri_target(path: &Path) -> Option<&str> {
    path.to_str()?.strip_prefix(URI_PREFIX)
}

async fn connect(path: &Path) -> sqlx::Result<Pool> {
    if let Some(target) = uri_target(path) {
        // query parameters such as `mode` and `cache` are honoured by sqlx
        let options =
            SqliteConnectOptions::from_str(&format!("sqlite:{target}"))?.create_if_missing(true);
        SqlitePoolOptions::new().connect_with(options).await
    } else if path == Path::new(IN_MEMORY) {
        // every new connection would see its own empty database, so pin exactly one
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
            .await
    } else {
        SqlitePoolOptions::new()
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal),
            )
            .await
    }
}

/// Verify connectivity and create the tables if they are absent.
///
/// Idempotent; safe to run on every startup and concurrently.
///
/// # Errors
///
/// Returns [`InitError::Connection`] if no connection can be acquired and
/// [`InitError::Schema`] if a schema statement fails.
pub async fn initialize(pool: &Pool) -> Result<(), InitError> {
    drop(pool.acquire().await.map_err(InitError::Connection)?);
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(InitError::Schema)?;
    debug!("Database schema ensured");
    Ok(())
}

/// Insert a new signup.
///
/// # Errors
///
/// Returns [`InsertError::Duplicate`] if the email is already stored and
/// [`InsertError::Storage`] for any other database failure.
#[tracing::instrument(skip(pool))]
pub async fn insert_waitlist(pool: &Pool, email: &str) -> Result<(), InsertError> {
    sqlx::query("INSERT INTO waitlist (email) VALUES (?)")
        .bind(email)
        .execute(pool)
        .await
        .map_err(|err| match err {
            SqlError::Database(ref db_err) if db_err.is_unique_violation() => {
                InsertError::Duplicate
            }
            other => InsertError::Storage(other),
        })?;
    Ok(())
}

/// Record a trapped submission. No uniqueness or syntax requirements apply.
///
/// # Errors
///
/// Returns an error if the insert fails.
#[tracing::instrument(skip(pool))]
pub async fn insert_honeypot(pool: &Pool, email: &str, trap_value: &str) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO waitlist_honeypot (email, trap_value) VALUES (?, ?)")
        .bind(email)
        .bind(trap_value)
        .execute(pool)
        .await?;
    Ok(())
}

/// All signups, oldest first; `id` breaks ties between equal timestamps.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_waitlist(pool: &Pool) -> sqlx::Result<Vec<WaitlistEntry>> {
    sqlx::query_as::<_, WaitlistEntry>(
        "SELECT id, email, created_at FROM waitlist ORDER BY created_at ASC, id ASC",
    )
    .fetch_all(pool)
    .await
}

/// All trapped submissions, oldest first; `id` breaks ties between equal timestamps.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_honeypot(pool: &Pool) -> sqlx::Result<Vec<HoneypotEntry>> {
    sqlx::query_as::<_, HoneypotEntry>(
        "SELECT id, email, trap_value, created_at FROM waitlist_honeypot ORDER BY created_at ASC, id ASC",
    )
    .fetch_all(pool)
    .await
}
