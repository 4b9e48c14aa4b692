//! ModKit database handle.
//!
//! Builds a sqlx pool for the configured engine (PostgreSQL or SQLite), wraps
//! it in a SeaORM connection and offers the small set of helpers the service
//! modules need: migration running and storage-error classification.
//!
//! ```rust,no_run
//! # async fn demo() -> modkit_db::Result<()> {
//! use modkit_db::{ConnectOpts, DbHandle};
//!
//! let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
//! let conn = db.sea();
//! # let _ = conn;
//! db.close().await;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use sea_orm::{DatabaseConnection, SqlxPostgresConnector, SqlxSqliteConnector};
use sea_orm_migration::MigratorTrait;
use sqlx::{
    postgres::PgPoolOptions,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    PgPool, SqlitePool,
};
use thiserror::Error;

pub mod errors;
pub mod sqlite;

pub use errors::is_unique_violation;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Invalid SQLite DSN: {0}")]
    InvalidSqliteDsn(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

/// Pool knobs; each driver applies the subset it supports.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    pub acquire_timeout: Option<Duration>,
    pub idle_timeout: Option<Duration>,
    /// SQLite `busy_timeout`; ignored for in-memory databases.
    pub sqlite_busy_timeout: Option<Duration>,
    /// For SQLite file DSNs, create parent directories if missing.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            sqlite_busy_timeout: Some(Duration::from_millis(5000)),
            create_sqlite_dirs: true,
        }
    }
}

#[derive(Clone, Debug)]
enum DbPool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

/// Main handle: owns the pool and the SeaORM connection built on it.
#[derive(Debug)]
pub struct DbHandle {
    engine: DbEngine,
    pool: DbPool,
    sea: DatabaseConnection,
}

impl DbHandle {
    /// Detect engine by DSN scheme.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        let s = dsn.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(dsn.to_string()))
        }
    }

    /// Connect and build handle.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        match Self::detect(dsn)? {
            DbEngine::Postgres => Self::connect_postgres(dsn, &opts).await,
            DbEngine::Sqlite => Self::connect_sqlite(dsn, &opts).await,
        }
    }

    async fn connect_postgres(dsn: &str, opts: &ConnectOpts) -> Result<Self> {
        let mut o = PgPoolOptions::new();
        if let Some(n) = opts.max_conns {
            o = o.max_connections(n);
        }
        if let Some(n) = opts.min_conns {
            o = o.min_connections(n);
        }
        if let Some(t) = opts.acquire_timeout {
            o = o.acquire_timeout(t);
        }
        o = o.idle_timeout(opts.idle_timeout);

        let pool = o.connect(dsn).await?;
        let sea = SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone());
        tracing::debug!("postgres pool ready");
        Ok(Self {
            engine: DbEngine::Postgres,
            pool: DbPool::Postgres(pool),
            sea,
        })
    }

    async fn connect_sqlite(dsn: &str, opts: &ConnectOpts) -> Result<Self> {
        let memory = sqlite::is_memory_dsn(dsn);
        if opts.create_sqlite_dirs && !memory {
            sqlite::ensure_parent_dir(dsn)?;
        }

        let connect_opts: SqliteConnectOptions = dsn
            .parse::<SqliteConnectOptions>()
            .map_err(|e| DbError::InvalidSqliteDsn(format!("{dsn}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut o = SqlitePoolOptions::new();
        if memory {
            // Every connection to `:memory:` opens its own database; keep exactly
            // one connection alive for the lifetime of the pool.
            o = o
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            if let Some(n) = opts.max_conns {
                o = o.max_connections(n);
            }
            if let Some(n) = opts.min_conns {
                o = o.min_connections(n);
            }
            o = o.idle_timeout(opts.idle_timeout);
        }
        if let Some(t) = opts.acquire_timeout {
            o = o.acquire_timeout(t);
        }

        let pragmas = sqlite::Pragmas::for_dsn(memory, opts.sqlite_busy_timeout);
        o = o.after_connect(move |conn, _meta| {
            let pragmas = pragmas.clone();
            Box::pin(async move {
                for stmt in pragmas.statements() {
                    sqlx::query(&stmt).execute(&mut *conn).await?;
                }
                Ok(())
            })
        });

        let pool = o.connect_with(connect_opts).await?;
        let sea = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());
        tracing::debug!(memory, "sqlite pool ready");
        Ok(Self {
            engine: DbEngine::Sqlite,
            pool: DbPool::Sqlite(pool),
            sea,
        })
    }

    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    /// SeaORM connection (clone; cheap handle).
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }

    /// Apply every pending migration of `M`; returns how many were applied.
    pub async fn migrate<M: MigratorTrait>(&self) -> Result<usize> {
        let pending = M::get_pending_migrations(&self.sea).await?;
        if pending.is_empty() {
            tracing::info!("no pending migrations");
            return Ok(0);
        }
        tracing::info!(count = pending.len(), "applying migrations");
        M::up(&self.sea, None).await?;
        Ok(pending.len())
    }

    /// Graceful pool close.
    pub async fn close(self) {
        match self.pool {
            DbPool::Postgres(p) => p.close().await,
            DbPool::Sqlite(p) => p.close().await,
        }
    }
}
