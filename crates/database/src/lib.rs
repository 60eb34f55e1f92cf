//! SQLite persistence layer for the anonymous chat matchmaker.
//!
//! This crate stores users, the waiting pool, chat sessions, messages, and
//! ratings using SQLx with SQLite. Every operation takes any
//! [`sqlx::SqliteExecutor`], so callers can run it directly on the pool or
//! compose several into one transaction via [`Database::begin`].
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, user, waiting, Gender};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:chat.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Register a user and park them in the pool
//!     user::upsert_user(db.pool(), "anon-42").await?;
//!
//!     let mut tx = db.begin().await?;
//!     waiting::delete_entry(&mut *tx, "anon-42").await?;
//!     waiting::upsert_entry(&mut *tx, "anon-42", Gender::Male, Gender::Any).await?;
//!     tx.commit().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod message;
pub mod models;
pub mod rating;
pub mod session;
pub mod user;
pub mod waiting;

pub use error::{DatabaseError, Result};
pub use models::{
    ChatSession, Gender, Message, Rating, RatingAggregate, SessionStatus, User, WaitingEntry,
};

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Set high enough for concurrent request handlers.
    pub const DEFAULT_POOL_SIZE: u32 = 20;

    /// How long a writer waits for SQLite's lock before giving up.
    pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/chat.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        Self::connect_with_options(url, pool_size, Self::DEFAULT_BUSY_TIMEOUT).await
    }

    /// Connect with a custom pool size and lock wait.
    ///
    /// A write that cannot take SQLite's lock within `busy_timeout` fails
    /// with `SQLITE_BUSY`.
    pub async fn connect_with_options(
        url: &str,
        pool_size: u32,
        busy_timeout: Duration,
    ) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {}, busy timeout: {:?})",
            url,
            pool_size,
            busy_timeout
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a transaction.
    ///
    /// Dropping the transaction without committing rolls it back.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
