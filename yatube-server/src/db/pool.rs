//! Opening the yatube database
//!
//! Commands go through [`open_store`]; tests that only need a pool use
//! [`create_pool`].

use std::borrow::Cow;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{migrations, PgStore};

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How long a request waits for a free connection before failing.
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a PostgreSQL connection pool.
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/yatube").await?;
/// ```
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(
        database = %redact_url(database_url),
        max_connections,
        "opening database pool"
    );
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
}

/// Open the Postgres store, bringing the schema up to date first when
/// `migrate` is set.
pub async fn open_store(
    database_url: &str,
    max_connections: u32,
    migrate: bool,
) -> Result<PgStore, sqlx::Error> {
    let pool = create_pool_with_options(database_url, max_connections).await?;
    if migrate {
        migrations::run(&pool).await?;
    }
    Ok(PgStore::new(pool))
}

/// Hide the password of a connection URL for logging.
fn redact_url(url: &str) -> Cow<'_, str> {
    let Some((scheme, rest)) = url.split_once("://") else {
        return Cow::Borrowed(url);
    };
    let (authority, tail) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
    let Some((userinfo, host)) = authority.rsplit_once('@') else {
        return Cow::Borrowed(url);
    };
    match userinfo.split_once(':') {
        Some((user, _)) => Cow::Owned(format!("{scheme}://{user}:***@{host}{tail}")),
        None => Cow::Borrowed(url),
    }
}
