//! Process-wide Postgres pool.
//!
//! The pool is created on first use and shared by every request afterwards.
//! Callers racing on the first request all await the same connection attempt;
//! if that attempt fails nothing is cached and the next caller tries again.

use color_eyre::eyre::WrapErr as _;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::OnceCell;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

const MAX_CONNECTIONS: u32 = 5;

/// Get the shared pool, connecting from `DATABASE_URL` on the first call
pub async fn get_pool() -> crate::Result<&'static PgPool> {
    POOL.get_or_try_init(|| async {
        let database_url =
            std::env::var("DATABASE_URL").wrap_err("DATABASE_URL environment variable not set")?;
        connect(&database_url).await
    })
    .await
}

#[cfg(test)]
fn is_initialized() -> bool {
    POOL.initialized()
}

/// Open a new pool and bring the schema up to date
#[tracing::instrument(err, skip(database_url))]
pub async fn connect(database_url: &str) -> crate::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await
        .wrap_err("Failed to connect to Postgres")?;

    run_migrations(&pool).await?;

    tracing::info!("Database pool ready");
    Ok(pool)
}

/// Runs migrations while holding an advisory lock so concurrent boots don't race
async fn run_migrations(pool: &PgPool) -> crate::Result<()> {
    const MIGRATION_LOCK_ID: i64 = 0xDB_DB_DB_DB_DB_DB_DB;

    // Advisory locks belong to a connection, so lock and unlock on the same one
    let mut conn = pool.acquire().await?;

    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MIGRATION_LOCK_ID)
        .execute(&mut *conn)
        .await?;

    let migrated = sqlx::migrate!("../migrations").run(pool).await;

    let unlocked: bool = sqlx::query_scalar("SELECT pg_advisory_unlock($1)")
        .bind(MIGRATION_LOCK_ID)
        .fetch_one(&mut *conn)
        .await?;

    if unlocked {
        tracing::info!("Migration lock unlocked");
    } else {
        tracing::warn!("Failed to unlock migration lock");
    }

    migrated.wrap_err("Failed to run migrations")?;
    Ok(())
}
